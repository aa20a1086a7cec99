//! Harvest: field sensors are sampled on a timer, then the apple record is created.

use super::{delayed_interval, StageError};
use crate::model::{AppleId, CreateApple};
use crate::sensors::harvest;
use crate::services::SupplyChainService;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};

#[derive(Debug, Clone)]
pub struct HarvestSettings {
    pub readings: u32,
    pub interval: Duration,
}

impl Default for HarvestSettings {
    fn default() -> Self {
        Self {
            readings: 5,
            interval: Duration::from_secs(9),
        }
    }
}

pub struct HarvestStage {
    settings: HarvestSettings,
    service: Arc<dyn SupplyChainService>,
    rng: StdRng,
}

impl HarvestStage {
    pub fn new(settings: HarvestSettings, service: Arc<dyn SupplyChainService>) -> Self {
        Self::with_rng(settings, service, StdRng::from_entropy())
    }

    pub fn with_rng(
        settings: HarvestSettings,
        service: Arc<dyn SupplyChainService>,
        rng: StdRng,
    ) -> Self {
        Self {
            settings,
            service,
            rng,
        }
    }

    /// Samples one humidity and one chemical value per interval.
    pub async fn collect(&mut self) -> CreateApple {
        let soil_composition = harvest::soil_composition(&mut self.rng);
        let mut humidity = Vec::with_capacity(self.settings.readings as usize);
        let mut chemicals = Vec::with_capacity(self.settings.readings as usize);

        let mut ticker = delayed_interval(self.settings.interval);
        for n in 1..=self.settings.readings {
            ticker.tick().await;
            let sample = harvest::sample(&mut self.rng);
            debug!(
                reading = n,
                humidity = sample.humidity,
                chemical = sample.chemical,
                "Harvest reading"
            );
            humidity.push(sample.humidity);
            chemicals.push(sample.chemical);
        }

        info!(%soil_composition, readings = humidity.len(), "Harvest data collected");
        CreateApple {
            soil_composition,
            humidity,
            chemicals,
        }
    }

    /// Creates the apple record from collected data.
    #[instrument(skip(self, harvest))]
    pub async fn submit(&self, harvest: &CreateApple) -> Result<AppleId, StageError> {
        let id = self.service.create_apple(harvest.clone()).await?;
        info!(apple_id = %id, "Apple created");
        Ok(id)
    }
}
