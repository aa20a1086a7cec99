//! # Lifecycle Tracker
//!
//! Walks one apple through `Harvest → Transit → Storage → Done`.
//!
//! The tracker owns the current [`Stage`] and the apple id produced by harvest. Each stage
//! runner must finish successfully before the tracker advances, and a stage can only
//! advance to the one directly after it.

use super::error::LifecycleError;
use super::operator::Operator;
use crate::model::{AppleId, FreshnessScore, Route, Sale, Stage, StoreListing};
use crate::services::{PricePredictor, SupplyChainService};
use crate::stages::{
    HarvestSettings, HarvestStage, StorageMonitor, StorageOutcome, StorageSettings,
    TransitSettings, TransitStage,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument};

/// Buyer recorded for a quick sale after spoilage.
pub const QUICK_SALE_BUYER: &str = "quick-sale";

#[derive(Debug, Clone)]
pub struct LifecycleSettings {
    pub harvest: HarvestSettings,
    pub transit: TransitSettings,
    pub storage: StorageSettings,
    pub transition_delay: Duration,
    pub operator: Operator,
}

impl Default for LifecycleSettings {
    fn default() -> Self {
        Self {
            harvest: HarvestSettings::default(),
            transit: TransitSettings::default(),
            storage: StorageSettings::default(),
            transition_delay: Duration::from_secs(1),
            operator: Operator::default(),
        }
    }
}

/// Summary of a finished lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LifecycleReport {
    pub apple_id: AppleId,
    pub route: Route,
    pub storage_readings: u32,
    pub final_stage: Stage,
}

pub struct LifecycleTracker {
    stage: Stage,
    apple_id: Option<AppleId>,
    settings: LifecycleSettings,
    service: Arc<dyn SupplyChainService>,
    predictor: Arc<dyn PricePredictor>,
}

impl LifecycleTracker {
    pub fn new(
        settings: LifecycleSettings,
        service: Arc<dyn SupplyChainService>,
        predictor: Arc<dyn PricePredictor>,
    ) -> Self {
        Self {
            stage: Stage::Harvest,
            apple_id: None,
            settings,
            service,
            predictor,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn apple_id(&self) -> Option<AppleId> {
        self.apple_id
    }

    /// Moves to `to`, which must directly follow the current stage.
    pub fn advance(&mut self, to: Stage) -> Result<(), LifecycleError> {
        if self.stage.next() != Some(to) {
            return Err(LifecycleError::InvalidTransition {
                from: self.stage,
                to,
            });
        }
        if matches!(to, Stage::Transit | Stage::Storage) && self.apple_id.is_none() {
            return Err(LifecycleError::MissingAppleId(to));
        }
        info!(from = %self.stage, %to, "Stage advanced");
        self.stage = to;
        Ok(())
    }

    fn require_id(&self) -> Result<AppleId, LifecycleError> {
        self.apple_id.ok_or(LifecycleError::MissingAppleId(self.stage))
    }

    async fn pause(&self) {
        tokio::time::sleep(self.settings.transition_delay).await;
    }

    /// Runs every stage in order.
    pub async fn run(mut self) -> Result<LifecycleReport, LifecycleError> {
        let apple_id = self.run_harvest().await?;
        self.apple_id = Some(apple_id);
        self.pause().await;
        self.advance(Stage::Transit)?;

        self.run_transit().await?;
        self.pause().await;
        self.advance(Stage::Storage)?;

        let outcome = self.run_storage().await?;
        self.apply_route(outcome.route).await?;
        self.advance(Stage::Done)?;

        Ok(LifecycleReport {
            apple_id,
            route: outcome.route,
            storage_readings: outcome.readings,
            final_stage: self.stage,
        })
    }

    #[instrument(skip(self), fields(stage = %self.stage))]
    async fn run_harvest(&mut self) -> Result<AppleId, LifecycleError> {
        let mut stage = HarvestStage::new(self.settings.harvest.clone(), self.service.clone());
        let harvest = stage.collect().await;

        let mut attempt = 1;
        loop {
            match stage.submit(&harvest).await {
                Ok(id) => return Ok(id),
                Err(e) => {
                    if !self.settings.operator.retry_after(attempt, "harvest", &e).await {
                        return Err(e.into());
                    }
                    attempt += 1;
                }
            }
        }
    }

    #[instrument(skip(self), fields(stage = %self.stage))]
    async fn run_transit(&mut self) -> Result<(), LifecycleError> {
        let apple_id = self.require_id()?;
        let mut stage = TransitStage::new(
            apple_id,
            self.settings.transit.clone(),
            self.service.clone(),
        );
        let log = stage.collect().await;

        let mut attempt = 1;
        loop {
            match stage.submit(log.clone()).await {
                Ok(()) => break,
                Err(e) => {
                    if !self.settings.operator.retry_after(attempt, "transport", &e).await {
                        return Err(e.into());
                    }
                    attempt += 1;
                }
            }
        }

        let metrics = stage.metrics();
        info!(
            %apple_id,
            hours = metrics.total_hours,
            distance_km = metrics.distance_km,
            average_speed = metrics.average_speed_kmh,
            "Journey complete"
        );
        Ok(())
    }

    #[instrument(skip(self), fields(stage = %self.stage))]
    async fn run_storage(&mut self) -> Result<StorageOutcome, LifecycleError> {
        let apple_id = self.require_id()?;
        let monitor = StorageMonitor::new(
            apple_id,
            self.settings.storage.clone(),
            self.service.clone(),
            self.predictor.clone(),
        );
        let (handle, events) = monitor.start().await?;
        Ok(self.settings.operator.supervise(handle, events).await?)
    }

    /// Settles the apple according to how storage ended.
    #[instrument(skip(self), fields(stage = %self.stage))]
    async fn apply_route(&self, route: Route) -> Result<(), LifecycleError> {
        let apple_id = self.require_id()?;
        let record = self
            .service
            .get_apple(apple_id)
            .await?
            .ok_or(LifecycleError::RecordMissing(apple_id))?;

        match route {
            Route::QuickSale => {
                let price = record
                    .current_price()
                    .unwrap_or(self.settings.storage.initial_price);
                let sale = Sale {
                    buyer: QUICK_SALE_BUYER.to_string(),
                    price,
                };
                self.service.sell_apple(apple_id, sale).await?;
                info!(%apple_id, price, "Sold");
            }
            Route::Completed => {
                let last = record.warehouse_logs.last();
                let listing = StoreListing {
                    ethylene_level: last.map(|l| l.ethylene_level).unwrap_or_default(),
                    freshness_score: last
                        .map(|l| l.freshness_score)
                        .unwrap_or(FreshnessScore::PERFECT),
                    timestamp: chrono::Utc::now().timestamp(),
                };
                self.service.log_store(apple_id, listing).await?;
                info!(%apple_id, "Listed in store");
            }
            Route::Charity | Route::ColdChamber => {
                info!(%apple_id, %route, "Route recorded");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{FixedPredictor, LedgerService};

    fn tracker() -> LifecycleTracker {
        let (actor, client) = crate::apple_actor::new();
        tokio::spawn(actor.run(()));
        LifecycleTracker::new(
            LifecycleSettings::default(),
            Arc::new(LedgerService::new(client)),
            Arc::new(FixedPredictor::new(None, 90)),
        )
    }

    #[tokio::test]
    async fn stages_cannot_be_skipped() {
        let mut tracker = tracker();
        assert_eq!(tracker.stage(), Stage::Harvest);
        assert!(matches!(
            tracker.advance(Stage::Storage),
            Err(LifecycleError::InvalidTransition {
                from: Stage::Harvest,
                to: Stage::Storage
            })
        ));
        assert!(matches!(
            tracker.advance(Stage::Harvest),
            Err(LifecycleError::InvalidTransition { .. })
        ));
    }

    #[tokio::test]
    async fn transit_requires_an_apple() {
        let mut tracker = tracker();
        assert!(matches!(
            tracker.advance(Stage::Transit),
            Err(LifecycleError::MissingAppleId(Stage::Transit))
        ));

        tracker.apple_id = Some(AppleId(0));
        tracker.advance(Stage::Transit).unwrap();
        tracker.advance(Stage::Storage).unwrap();
        tracker.advance(Stage::Done).unwrap();
        assert!(tracker.advance(Stage::Done).is_err());
    }
}
