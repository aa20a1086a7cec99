//! Stage runners.
//!
//! Each runner samples synthetic sensors on a timer and submits what it collected to a
//! [`SupplyChainService`](crate::services::SupplyChainService):
//!
//! - [`harvest`] - field readings, then the record is created
//! - [`transit`] - a simulated truck journey, logged once
//! - [`storage`] - a long-running warehouse monitor gated one reading at a time

pub mod error;
pub mod harvest;
pub mod storage;
pub mod transit;

pub use error::StageError;
pub use harvest::{HarvestSettings, HarvestStage};
pub use storage::{
    StorageEvent, StorageHandle, StorageMonitor, StorageOutcome, StorageSettings,
    StorageSnapshot,
};
pub use transit::{TransitSettings, TransitStage};

use std::time::Duration;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

/// Interval whose first tick arrives one period from now.
pub(crate) fn delayed_interval(period: Duration) -> Interval {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}
