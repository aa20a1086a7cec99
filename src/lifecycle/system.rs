use crate::clients::AppleClient;
use crate::services::LedgerService;
use std::sync::Arc;
use tracing::{error, info};

/// Owns the in-process apple ledger.
///
/// `SupplyChainSystem` starts the ledger actor and keeps its task handle so the actor can
/// be shut down cleanly once every lifecycle using it has finished.
///
/// # Example
///
/// ```ignore
/// let system = SupplyChainSystem::new();
/// let tracker = LifecycleTracker::new(settings, system.service(), predictor);
/// let report = tracker.run().await?;
/// system.shutdown().await?;
/// ```
pub struct SupplyChainSystem {
    pub apple_client: AppleClient,
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl Default for SupplyChainSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl SupplyChainSystem {
    /// Spawns the apple ledger. Must be called inside a Tokio runtime.
    pub fn new() -> Self {
        let (apple_actor, apple_client) = crate::apple_actor::new();
        let apple_handle = tokio::spawn(apple_actor.run(()));

        Self {
            apple_client,
            handles: vec![apple_handle],
        }
    }

    /// A service over this system's ledger.
    pub fn service(&self) -> Arc<LedgerService> {
        Arc::new(LedgerService::new(self.apple_client.clone()))
    }

    /// Closes the ledger and waits for its task.
    ///
    /// The actor only stops once every client clone is gone, so services handed out by
    /// [`service`](Self::service) must be dropped first.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down ledger");
        drop(self.apple_client);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!(error = ?e, "Ledger task failed");
                return Err(format!("Ledger task failed: {e:?}"));
            }
        }

        info!("Ledger shutdown complete");
        Ok(())
    }
}
