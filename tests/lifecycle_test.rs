use apple_lifecycle::ledger::LedgerReader;
use apple_lifecycle::lifecycle::{
    LifecycleError, LifecycleSettings, LifecycleTracker, Operator, SupplyChainSystem,
    QUICK_SALE_BUYER,
};
use apple_lifecycle::model::{
    AppleId, AppleRecord, CreateApple, Route, Sale, Stage, StorageSubmission, StoreListing,
    TransportLog,
};
use apple_lifecycle::services::{FixedPredictor, ServiceError, SupplyChainService};
use apple_lifecycle::stages::StageError;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn predictor() -> Arc<FixedPredictor> {
    Arc::new(FixedPredictor::new(Some(80), 90))
}

async fn record(system: &SupplyChainSystem, id: AppleId) -> AppleRecord {
    system
        .apple_client
        .get(id)
        .await
        .expect("Failed to get apple")
        .expect("Apple not found")
}

/// Full run against the in-process ledger: spoilage at reading seven, then a quick sale.
#[tokio::test(start_paused = true)]
async fn lifecycle_spoils_and_sells() {
    let system = SupplyChainSystem::new();
    let tracker = LifecycleTracker::new(
        LifecycleSettings::default(),
        system.service(),
        predictor(),
    );

    let report = tracker.run().await.expect("Lifecycle failed");
    assert_eq!(report.apple_id, AppleId(0));
    assert_eq!(report.final_stage, Stage::Done);
    assert_eq!(report.route, Route::QuickSale);
    assert_eq!(report.storage_readings, 7);

    let apple = record(&system, report.apple_id).await;
    assert_eq!(apple.harvest.humidity.len(), 5);
    assert_eq!(apple.harvest.chemicals.len(), 5);

    let transport = apple.transport.as_ref().expect("transport logged");
    assert_eq!(transport.temperatures.len(), 3);
    assert!(transport.end_timestamp > transport.start_timestamp);

    // Baseline plus seven readings, the last one at the threshold.
    assert_eq!(apple.warehouse_logs.len(), 8);
    assert_eq!(apple.warehouse_logs[0].ethylene_level, 3);
    assert_eq!(apple.warehouse_logs[7].ethylene_level, 10);

    assert!(apple.store.sold);
    assert_eq!(apple.store.buyer.as_deref(), Some(QUICK_SALE_BUYER));
    assert_eq!(apple.current_price(), Some(80));

    system.shutdown().await.expect("Shutdown failed");
}

#[tokio::test(start_paused = true)]
async fn reading_cap_lists_the_apple_in_store() {
    let system = SupplyChainSystem::new();
    let mut settings = LifecycleSettings::default();
    settings.storage.max_readings = Some(2);

    let report = LifecycleTracker::new(settings, system.service(), predictor())
        .run()
        .await
        .expect("Lifecycle failed");
    assert_eq!(report.route, Route::Completed);
    assert_eq!(report.storage_readings, 2);

    let apple = record(&system, report.apple_id).await;
    assert!(apple.store.is_listed());
    assert!(!apple.is_sold());
    assert_eq!(apple.store.ethylene_level, 5);
    assert_eq!(apple.store.freshness_score.value(), 90);

    system.shutdown().await.expect("Shutdown failed");
}

#[tokio::test(start_paused = true)]
async fn cold_chamber_route_leaves_apple_unsold() {
    let system = SupplyChainSystem::new();
    let settings = LifecycleSettings {
        operator: Operator::new(3, Duration::from_secs(1), Route::ColdChamber),
        ..LifecycleSettings::default()
    };

    let report = LifecycleTracker::new(settings, system.service(), predictor())
        .run()
        .await
        .expect("Lifecycle failed");
    assert_eq!(report.route, Route::ColdChamber);

    let apple = record(&system, report.apple_id).await;
    assert!(!apple.is_sold());
    assert!(!apple.store.is_listed());

    system.shutdown().await.expect("Shutdown failed");
}

/// Ledger-backed service whose first `failures` transport submissions fail.
struct FlakyTransport {
    inner: Arc<dyn SupplyChainService>,
    failures: AtomicU32,
}

#[async_trait]
impl SupplyChainService for FlakyTransport {
    async fn create_apple(&self, harvest: CreateApple) -> Result<AppleId, ServiceError> {
        self.inner.create_apple(harvest).await
    }

    async fn log_transport(&self, id: AppleId, log: TransportLog) -> Result<(), ServiceError> {
        let remaining = self.failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures.store(remaining - 1, Ordering::SeqCst);
            return Err(ServiceError::Rejected("backend unavailable".into()));
        }
        self.inner.log_transport(id, log).await
    }

    async fn process_storage_reading(
        &self,
        id: AppleId,
        submission: StorageSubmission,
    ) -> Result<(), ServiceError> {
        self.inner.process_storage_reading(id, submission).await
    }

    async fn log_store(&self, id: AppleId, listing: StoreListing) -> Result<(), ServiceError> {
        self.inner.log_store(id, listing).await
    }

    async fn sell_apple(&self, id: AppleId, sale: Sale) -> Result<(), ServiceError> {
        self.inner.sell_apple(id, sale).await
    }

    async fn get_apple(&self, id: AppleId) -> Result<Option<AppleRecord>, ServiceError> {
        self.inner.get_apple(id).await
    }

    async fn list_apples(&self) -> Result<Vec<AppleRecord>, ServiceError> {
        self.inner.list_apples().await
    }
}

#[tokio::test(start_paused = true)]
async fn transport_failures_are_retried() {
    let system = SupplyChainSystem::new();
    let service = Arc::new(FlakyTransport {
        inner: system.service(),
        failures: AtomicU32::new(2),
    });

    let report = LifecycleTracker::new(LifecycleSettings::default(), service, predictor())
        .run()
        .await
        .expect("Lifecycle failed");
    assert_eq!(report.final_stage, Stage::Done);
    assert!(record(&system, report.apple_id).await.has_transport());

    system.shutdown().await.expect("Shutdown failed");
}

#[tokio::test(start_paused = true)]
async fn lifecycle_stops_when_retries_run_out() {
    let system = SupplyChainSystem::new();
    let service = Arc::new(FlakyTransport {
        inner: system.service(),
        failures: AtomicU32::new(5),
    });

    let result = LifecycleTracker::new(LifecycleSettings::default(), service, predictor())
        .run()
        .await;
    assert!(matches!(
        result,
        Err(LifecycleError::Stage(StageError::Service(ServiceError::Rejected(_))))
    ));

    // Harvest went through; nothing after it did.
    let apple = record(&system, AppleId(0)).await;
    assert!(!apple.has_transport());
    assert!(apple.warehouse_logs.is_empty());

    system.shutdown().await.expect("Shutdown failed");
}
