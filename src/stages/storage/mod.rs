//! # Storage Monitor
//!
//! Warehouse monitoring for one apple, run as its own task.
//!
//! The monitor owns a [`ReadingGate`] and the periodic timer. It generates a reading on
//! each tick while the gate is idle, asks the [`PricePredictor`] to value it, and stages
//! it. Committing a reading is driven from outside through [`StorageHandle::submit`], the
//! same way an operator approves a pending reading.
//!
//! ```text
//!   tick ──▶ sample + predict ──▶ stage ──▶ StorageEvent::ReadingPending
//!                                               │
//!   StorageHandle::submit ──▶ service ──▶ commit ──▶ StorageEvent::ReadingCommitted
//! ```
//!
//! Once a reading at or above the ethylene threshold is staged, the timer is dropped for
//! good. After that reading is committed the monitor waits for
//! [`StorageHandle::remediate`].

pub mod gate;

use crate::model::{
    AppleId, FreshnessScore, Route, StorageReading, StorageSubmission, Valuation,
};
use crate::sensors::warehouse;
use crate::services::{PricePredictor, SupplyChainService};
use crate::stages::StageError;
use gate::{GateState, PendingReading, ReadingGate, Site};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{interval, Interval, MissedTickBehavior};
use tracing::{debug, info, instrument, warn};

/// Baseline sensor values recorded with the initial price.
const BASELINE_TEMPERATURE: u32 = 20;
const BASELINE_ETHYLENE: u32 = 3;

#[derive(Debug, Clone)]
pub struct StorageSettings {
    pub interval: Duration,
    pub site: Site,
    pub initial_price: u64,
    pub ethylene_threshold: u32,
    /// Finish with [`Route::Completed`] after this many committed readings.
    pub max_readings: Option<u32>,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
            site: Site::default(),
            initial_price: 100,
            ethylene_threshold: 10,
            max_readings: None,
        }
    }
}

/// Commands accepted by a running monitor.
#[derive(Debug)]
pub enum StorageCommand {
    /// Submits the pending reading, optionally with an operator-supplied valuation.
    Submit {
        valuation: Option<Valuation>,
        respond_to: oneshot::Sender<Result<StorageSubmission, StageError>>,
    },
    Remediate {
        route: Route,
        respond_to: oneshot::Sender<Result<(), StageError>>,
    },
    Snapshot {
        respond_to: oneshot::Sender<StorageSnapshot>,
    },
}

/// Notifications emitted while monitoring.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum StorageEvent {
    ReadingPending(PendingReading),
    /// The staged reading reached the ethylene threshold.
    SpoilageDetected(PendingReading),
    ReadingCommitted {
        reading: u32,
        price: u64,
        freshness: FreshnessScore,
    },
    SubmitFailed {
        reading: u32,
        error: String,
    },
    PredictionFailed {
        reading: u32,
        error: String,
    },
    Finished(StorageOutcome),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StorageOutcome {
    pub route: Route,
    /// Committed readings, not counting the baseline.
    pub readings: u32,
}

/// Point-in-time view of a monitor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StorageSnapshot {
    pub state: GateState,
    pub pending: Option<PendingReading>,
    pub committed: u32,
    pub last_price: u64,
    pub spoiled: bool,
}

/// Handle to a running monitor.
///
/// Dropping the handle (or calling [`join`](Self::join)) closes the command channel.
pub struct StorageHandle {
    commands: mpsc::Sender<StorageCommand>,
    task: JoinHandle<Result<StorageOutcome, StageError>>,
}

impl StorageHandle {
    async fn request<R>(
        &self,
        build: impl FnOnce(oneshot::Sender<R>) -> StorageCommand,
    ) -> Result<R, StageError> {
        let (respond_to, response) = oneshot::channel();
        self.commands
            .send(build(respond_to))
            .await
            .map_err(|_| StageError::MonitorStopped)?;
        response.await.map_err(|_| StageError::MonitorStopped)
    }

    pub async fn submit(
        &self,
        valuation: Option<Valuation>,
    ) -> Result<StorageSubmission, StageError> {
        self.request(|respond_to| StorageCommand::Submit {
            valuation,
            respond_to,
        })
        .await?
    }

    pub async fn remediate(&self, route: Route) -> Result<(), StageError> {
        self.request(|respond_to| StorageCommand::Remediate { route, respond_to })
            .await?
    }

    pub async fn snapshot(&self) -> Result<StorageSnapshot, StageError> {
        self.request(|respond_to| StorageCommand::Snapshot { respond_to })
            .await
    }

    /// Closes the command channel and waits for the monitor to end.
    pub async fn join(self) -> Result<StorageOutcome, StageError> {
        drop(self.commands);
        self.task.await.map_err(|_| StageError::MonitorStopped)?
    }
}

pub struct StorageMonitor {
    apple_id: AppleId,
    settings: StorageSettings,
    service: Arc<dyn SupplyChainService>,
    predictor: Arc<dyn PricePredictor>,
    rng: StdRng,
    gate: ReadingGate,
    last_price: u64,
}

impl StorageMonitor {
    pub fn new(
        apple_id: AppleId,
        settings: StorageSettings,
        service: Arc<dyn SupplyChainService>,
        predictor: Arc<dyn PricePredictor>,
    ) -> Self {
        Self::with_rng(apple_id, settings, service, predictor, StdRng::from_entropy())
    }

    pub fn with_rng(
        apple_id: AppleId,
        settings: StorageSettings,
        service: Arc<dyn SupplyChainService>,
        predictor: Arc<dyn PricePredictor>,
        rng: StdRng,
    ) -> Self {
        let gate = ReadingGate::new(settings.ethylene_threshold, settings.site.clone());
        Self {
            apple_id,
            last_price: settings.initial_price,
            settings,
            service,
            predictor,
            rng,
            gate,
        }
    }

    /// Records the initial price, then starts monitoring in a background task.
    ///
    /// Returns the command handle and the event stream.
    #[instrument(skip(self), fields(apple_id = %self.apple_id))]
    pub async fn start(
        self,
    ) -> Result<(StorageHandle, mpsc::UnboundedReceiver<StorageEvent>), StageError> {
        if self.settings.initial_price == 0 {
            return Err(StageError::InvalidInitialPrice);
        }

        let baseline = StorageSubmission {
            reading: StorageReading {
                id: 0,
                temperature: BASELINE_TEMPERATURE,
                ethylene: BASELINE_ETHYLENE,
                timestamp: now(),
                location: self.settings.site.location.clone(),
                state: self.settings.site.state.clone(),
                spoilage_risk: false,
            },
            price: self.settings.initial_price,
            freshness_score: FreshnessScore::PERFECT,
        };
        self.service
            .process_storage_reading(self.apple_id, baseline)
            .await?;
        info!(initial_price = self.settings.initial_price, "Initial setup completed");

        let (commands, receiver) = mpsc::channel(8);
        let (events, event_receiver) = mpsc::unbounded_channel();
        let task = tokio::spawn(self.run(receiver, events));

        Ok((StorageHandle { commands, task }, event_receiver))
    }

    async fn run(
        mut self,
        mut commands: mpsc::Receiver<StorageCommand>,
        events: mpsc::UnboundedSender<StorageEvent>,
    ) -> Result<StorageOutcome, StageError> {
        let apple_id = self.apple_id;
        info!(%apple_id, "Storage monitoring started");

        // The first tick fires immediately.
        let mut ticker = Some(interval(self.settings.interval));
        if let Some(t) = ticker.as_mut() {
            t.set_missed_tick_behavior(MissedTickBehavior::Skip);
        }

        loop {
            if let Some(route) = self.gate.finished() {
                let outcome = StorageOutcome {
                    route,
                    readings: self.gate.committed(),
                };
                info!(
                    %apple_id,
                    %route,
                    readings = outcome.readings,
                    "Storage monitoring finished"
                );
                let _ = events.send(StorageEvent::Finished(outcome));
                return Ok(outcome);
            }

            tokio::select! {
                _ = next_tick(&mut ticker) => {
                    if self.gate.can_generate() {
                        self.generate(&events).await;
                    } else {
                        debug!(
                            %apple_id,
                            state = %self.gate.state(),
                            "Waiting for current reading"
                        );
                    }
                    if self.gate.is_spoiled() {
                        ticker = None;
                    }
                }
                command = commands.recv() => match command {
                    Some(StorageCommand::Submit { valuation, respond_to }) => {
                        let result = self.submit(valuation, &events).await;
                        let _ = respond_to.send(result);
                    }
                    Some(StorageCommand::Remediate { route, respond_to }) => {
                        let result = self.gate.remediate(route).map_err(StageError::from);
                        match &result {
                            Ok(()) => info!(%apple_id, %route, "Remediation chosen"),
                            Err(e) => warn!(%apple_id, error = %e, "Remediation refused"),
                        }
                        let _ = respond_to.send(result);
                    }
                    Some(StorageCommand::Snapshot { respond_to }) => {
                        let _ = respond_to.send(self.snapshot());
                    }
                    None => {
                        info!(%apple_id, state = %self.gate.state(), "Storage handle dropped");
                        return Err(StageError::MonitorStopped);
                    }
                }
            }
        }
    }

    async fn generate(&mut self, events: &mpsc::UnboundedSender<StorageEvent>) {
        let apple_id = self.apple_id;
        let number = self.gate.next_reading_number();
        let sample = warehouse::sample(&mut self.rng, number);
        debug!(
            %apple_id,
            reading = number,
            temperature = sample.temperature,
            ethylene = sample.ethylene,
            "Sampled"
        );

        let valuation = match self
            .predictor
            .predict(sample.temperature, sample.ethylene, self.last_price)
            .await
        {
            Ok(valuation) => valuation,
            Err(e) => {
                warn!(%apple_id, reading = number, error = %e, "Prediction failed");
                let _ = events.send(StorageEvent::PredictionFailed {
                    reading: number,
                    error: e.to_string(),
                });
                return;
            }
        };

        match self.gate.stage(sample, valuation, now()) {
            Ok(pending) if pending.reading.spoilage_risk => {
                warn!(
                    %apple_id,
                    reading = number,
                    ethylene = sample.ethylene,
                    "Spoilage detected"
                );
                let _ = events.send(StorageEvent::SpoilageDetected(pending));
            }
            Ok(pending) => {
                info!(%apple_id, reading = number, price = valuation.price, "Reading pending");
                let _ = events.send(StorageEvent::ReadingPending(pending));
            }
            Err(e) => warn!(%apple_id, error = %e, "Reading not staged"),
        }
    }

    async fn submit(
        &mut self,
        valuation: Option<Valuation>,
        events: &mpsc::UnboundedSender<StorageEvent>,
    ) -> Result<StorageSubmission, StageError> {
        let apple_id = self.apple_id;
        let submission = self.gate.submission(valuation)?;
        let reading = submission.reading.id;

        if let Err(e) = self
            .service
            .process_storage_reading(apple_id, submission.clone())
            .await
        {
            warn!(%apple_id, reading, error = %e, "Submit failed");
            let _ = events.send(StorageEvent::SubmitFailed {
                reading,
                error: e.to_string(),
            });
            return Err(e.into());
        }

        self.gate.commit(&submission)?;
        self.last_price = submission.price;
        info!(
            %apple_id,
            reading,
            price = submission.price,
            freshness = %submission.freshness_score,
            "Reading committed"
        );
        let _ = events.send(StorageEvent::ReadingCommitted {
            reading,
            price: submission.price,
            freshness: submission.freshness_score,
        });

        if let Some(max) = self.settings.max_readings {
            if self.gate.committed() >= max && self.gate.can_generate() {
                self.gate.complete()?;
            }
        }
        Ok(submission)
    }

    fn snapshot(&self) -> StorageSnapshot {
        StorageSnapshot {
            state: self.gate.state(),
            pending: self.gate.pending().cloned(),
            committed: self.gate.committed(),
            last_price: self.last_price,
            spoiled: self.gate.is_spoiled(),
        }
    }
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Next tick of the timer, or never once the timer has been dropped.
async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(t) => {
            t.tick().await;
        }
        None => std::future::pending().await,
    }
}
