//! Transit: a simulated journey is sampled on a timer and logged once.

use super::{delayed_interval, StageError};
use crate::model::{AppleId, TransportLog};
use crate::sensors::transit::{gps_coordinates, JourneyMetrics, TransportJourney};
use crate::services::SupplyChainService;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone)]
pub struct TransitSettings {
    pub readings: u32,
    pub interval: Duration,
}

impl Default for TransitSettings {
    fn default() -> Self {
        Self {
            readings: 3,
            interval: Duration::from_secs(3),
        }
    }
}

/// Runs one transport journey for one apple.
///
/// The journey can be logged only once. A submit that is in flight or has succeeded
/// blocks further submits; a failed submit releases the guard so it can be retried.
pub struct TransitStage {
    apple_id: AppleId,
    settings: TransitSettings,
    service: Arc<dyn SupplyChainService>,
    rng: StdRng,
    journey: TransportJourney,
    submitted: bool,
}

impl TransitStage {
    pub fn new(
        apple_id: AppleId,
        settings: TransitSettings,
        service: Arc<dyn SupplyChainService>,
    ) -> Self {
        Self::with_rng(apple_id, settings, service, StdRng::from_entropy(), Utc::now())
    }

    pub fn with_rng(
        apple_id: AppleId,
        settings: TransitSettings,
        service: Arc<dyn SupplyChainService>,
        mut rng: StdRng,
        now: DateTime<Utc>,
    ) -> Self {
        let journey = TransportJourney::new(&mut rng, now);
        Self {
            apple_id,
            settings,
            service,
            rng,
            journey,
            submitted: false,
        }
    }

    /// Takes one reading per interval and builds the transport log.
    pub async fn collect(&mut self) -> TransportLog {
        let (start_timestamp, end_timestamp) = self.journey.timestamps();
        let mut temperatures = Vec::with_capacity(self.settings.readings as usize);
        let mut ethylene_levels = Vec::with_capacity(self.settings.readings as usize);

        let started = Instant::now();
        let mut ticker = delayed_interval(self.settings.interval);
        for n in 1..=self.settings.readings {
            ticker.tick().await;
            let reading = self.journey.next_reading(&mut self.rng);
            let info = self.journey.journey_info(started.elapsed());
            debug!(
                apple_id = %self.apple_id,
                reading = n,
                temperature = reading.temperature,
                ethylene = reading.ethylene,
                phase = reading.phase.description(),
                progress = info.progress,
                spoilage = %info.spoilage,
                "Transit reading"
            );
            temperatures.push(reading.temperature.round() as u32);
            ethylene_levels.push(reading.ethylene.trunc() as u32);
        }

        info!(
            apple_id = %self.apple_id,
            readings = temperatures.len(),
            spoilage = %self.journey.spoilage_level(),
            "Transit data collected"
        );
        TransportLog {
            start_timestamp,
            end_timestamp,
            gps_coordinates: gps_coordinates(&mut self.rng),
            temperatures,
            ethylene_levels,
        }
    }

    #[instrument(skip(self, log), fields(apple_id = %self.apple_id))]
    pub async fn submit(&mut self, log: TransportLog) -> Result<(), StageError> {
        if self.submitted {
            warn!("Transport already submitted");
            return Err(StageError::AlreadySubmitted);
        }
        self.submitted = true;

        match self.service.log_transport(self.apple_id, log).await {
            Ok(()) => {
                info!("Transport logged");
                Ok(())
            }
            Err(e) => {
                self.submitted = false;
                warn!(error = %e, "Transport submit failed");
                Err(e.into())
            }
        }
    }

    /// Speed, distance and fuel figures for the finished journey.
    pub fn metrics(&mut self) -> JourneyMetrics {
        self.journey.metrics(&mut self.rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AppleRecord, CreateApple, Sale, StorageSubmission, StoreListing};
    use crate::services::ServiceError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails the first `failures` transport calls, then accepts.
    struct FlakyTransport {
        failures: u32,
        calls: AtomicU32,
    }

    #[async_trait]
    impl SupplyChainService for FlakyTransport {
        async fn create_apple(&self, _: CreateApple) -> Result<AppleId, ServiceError> {
            Ok(AppleId(0))
        }
        async fn log_transport(&self, _: AppleId, _: TransportLog) -> Result<(), ServiceError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err(ServiceError::Rejected("backend busy".into()))
            } else {
                Ok(())
            }
        }
        async fn process_storage_reading(
            &self,
            _: AppleId,
            _: StorageSubmission,
        ) -> Result<(), ServiceError> {
            Ok(())
        }
        async fn log_store(&self, _: AppleId, _: StoreListing) -> Result<(), ServiceError> {
            Ok(())
        }
        async fn sell_apple(&self, _: AppleId, _: Sale) -> Result<(), ServiceError> {
            Ok(())
        }
        async fn get_apple(&self, _: AppleId) -> Result<Option<AppleRecord>, ServiceError> {
            Ok(None)
        }
        async fn list_apples(&self) -> Result<Vec<AppleRecord>, ServiceError> {
            Ok(Vec::new())
        }
    }

    fn stage(failures: u32) -> TransitStage {
        let service = Arc::new(FlakyTransport {
            failures,
            calls: AtomicU32::new(0),
        });
        TransitStage::with_rng(
            AppleId(0),
            TransitSettings::default(),
            service,
            StdRng::seed_from_u64(7),
            Utc::now(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn collects_readings_on_the_transit_interval() {
        let mut stage = stage(0);
        let started = Instant::now();
        let log = stage.collect().await;

        assert_eq!(started.elapsed(), Duration::from_secs(9));
        assert_eq!(log.temperatures.len(), 3);
        assert_eq!(log.ethylene_levels.len(), 3);
        assert_eq!(log.gps_coordinates.len(), 2);
        assert!(log.end_timestamp > log.start_timestamp);
        assert!(log.temperatures.iter().all(|t| *t <= 25));
        assert!(log.ethylene_levels.windows(2).all(|w| w[0] <= w[1]));
    }

    #[tokio::test]
    async fn second_submit_is_rejected() {
        let mut stage = stage(0);
        let log = TransportLog::default();
        stage.submit(log.clone()).await.unwrap();
        assert!(matches!(
            stage.submit(log).await,
            Err(StageError::AlreadySubmitted)
        ));
    }

    #[tokio::test]
    async fn failed_submit_can_be_retried() {
        let mut stage = stage(1);
        let log = TransportLog::default();
        assert!(matches!(
            stage.submit(log.clone()).await,
            Err(StageError::Service(ServiceError::Rejected(_)))
        ));
        stage.submit(log).await.unwrap();
    }
}
