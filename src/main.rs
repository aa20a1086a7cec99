//! # Apple Lifecycle CLI
//!
//! - `run`: drives one apple through harvest, transit and storage.
//! - `list`: prints every apple the backend knows about.
//! - `show <id>`: prints one apple in detail.
//! - `shelf`: prints the backend's product listing.
//!
//! Configuration comes from `--config` (or `apple-lifecycle.toml`), then the environment,
//! then `--backend`.

use apple_lifecycle::config::{AppConfig, BackendMode, PredictorMode};
use apple_lifecycle::errors::{Error, Result};
use apple_lifecycle::lifecycle::tracing::setup_tracing;
use apple_lifecycle::lifecycle::{LifecycleTracker, SupplyChainSystem};
use apple_lifecycle::model::AppleId;
use apple_lifecycle::services::{
    BackendClient, FixedPredictor, PricePredictor, PredictorClient, SupplyChainService,
};
use apple_lifecycle::viewer;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, Instrument};

const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Parser)]
#[command(author, version, about = "Simulate an apple's journey from orchard to shelf")]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Where records are kept: `ledger` (in-process) or `http`
    #[arg(long, global = true)]
    backend: Option<BackendMode>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one full lifecycle
    Run,
    /// List all apples
    List,
    /// Show one apple in detail
    Show { id: u64 },
    /// Show apples offered for sale (always asks the HTTP backend)
    Shelf,
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_tracing();

    let cli = Cli::parse();
    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(mode) = cli.backend {
        config.backend.mode = mode;
    }
    info!(backend = ?config.backend.mode, "Configuration loaded");

    // Kept alive until shutdown when the in-process ledger is used.
    let system = match config.backend.mode {
        BackendMode::Ledger => Some(SupplyChainSystem::new()),
        BackendMode::Http => None,
    };
    let service: Arc<dyn SupplyChainService> = match &system {
        Some(system) => system.service(),
        None => Arc::new(BackendClient::with_timeout(
            config.backend.base_url.clone(),
            HTTP_TIMEOUT,
        )?),
    };

    let outcome = match cli.command {
        Commands::Run => run(&config, service.clone()).await,
        Commands::List => {
            let apples = viewer::fetch_all(service.as_ref()).await?;
            print!("{}", viewer::render_list(&apples));
            Ok(())
        }
        Commands::Shelf => {
            let backend = BackendClient::with_timeout(
                config.backend.base_url.clone(),
                HTTP_TIMEOUT,
            )?;
            let items = backend.shelf().await?;
            print!("{}", viewer::render_shelf(&items));
            Ok(())
        }
        Commands::Show { id } => {
            let apple = viewer::fetch_one(service.as_ref(), AppleId(id)).await?;
            print!("{}", viewer::render_details(&apple));
            Ok(())
        }
    };

    // The ledger stops only once every client clone is gone.
    drop(service);
    if let Some(system) = system {
        system.shutdown().await.map_err(Error::Shutdown)?;
    }
    outcome
}

async fn run(config: &AppConfig, service: Arc<dyn SupplyChainService>) -> Result<()> {
    let predictor: Arc<dyn PricePredictor> = match config.predictor.mode {
        PredictorMode::Http => Arc::new(PredictorClient::new(config.predictor.base_url.clone())),
        PredictorMode::Fixed => Arc::new(FixedPredictor::new(
            config.predictor.fixed_price,
            config.predictor.fixed_freshness,
        )),
    };

    let tracker = LifecycleTracker::new(config.lifecycle_settings(), service, predictor);
    let span = tracing::info_span!("lifecycle");
    match tracker.run().instrument(span).await {
        Ok(report) => {
            info!(
                apple_id = %report.apple_id,
                route = %report.route,
                readings = report.storage_readings,
                "Lifecycle complete"
            );
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Lifecycle failed");
            Err(e.into())
        }
    }
}
