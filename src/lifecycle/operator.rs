//! Automatic operator for the storage stage.
//!
//! Stands in for the person approving readings: every pending reading is submitted,
//! failed submits are retried a bounded number of times, and once spoilage has been
//! committed the configured route is applied.

use crate::model::{Route, Valuation};
use crate::stages::storage::gate::{GateError, PendingReading};
use crate::stages::{StageError, StorageEvent, StorageHandle, StorageOutcome};
use std::fmt::Display;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct Operator {
    submit_attempts: u32,
    retry_delay: Duration,
    spoilage_route: Route,
}

impl Default for Operator {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1), Route::QuickSale)
    }
}

impl Operator {
    /// `submit_attempts` counts the first try; it is never less than one.
    pub fn new(submit_attempts: u32, retry_delay: Duration, spoilage_route: Route) -> Self {
        Self {
            submit_attempts: submit_attempts.max(1),
            retry_delay,
            spoilage_route,
        }
    }

    pub fn submit_attempts(&self) -> u32 {
        self.submit_attempts
    }

    pub fn spoilage_route(&self) -> Route {
        self.spoilage_route
    }

    /// Whether a failed `attempt` (1-based) should be retried. Sleeps before returning `true`.
    pub async fn retry_after(&self, attempt: u32, what: &str, error: &dyn Display) -> bool {
        if attempt >= self.submit_attempts {
            warn!(attempt, what, %error, "Giving up");
            return false;
        }
        warn!(attempt, what, %error, "Retrying");
        tokio::time::sleep(self.retry_delay).await;
        true
    }

    /// Drives a running monitor until it finishes.
    pub async fn supervise(
        &self,
        handle: StorageHandle,
        mut events: mpsc::UnboundedReceiver<StorageEvent>,
    ) -> Result<StorageOutcome, StageError> {
        while let Some(event) = events.recv().await {
            match event {
                StorageEvent::ReadingPending(pending) => {
                    self.approve(&handle, &pending).await?;
                }
                StorageEvent::SpoilageDetected(pending) => {
                    self.approve(&handle, &pending).await?;
                    info!(route = %self.spoilage_route, "Applying spoilage route");
                    handle.remediate(self.spoilage_route).await?;
                }
                StorageEvent::PredictionFailed { reading, error } => {
                    warn!(reading, %error, "Prediction failed, waiting for next tick");
                }
                StorageEvent::Finished(outcome) => {
                    debug!(?outcome, "Monitor finished");
                    break;
                }
                other => debug!(?other, "Storage event"),
            }
        }
        handle.join().await
    }

    async fn approve(
        &self,
        handle: &StorageHandle,
        pending: &PendingReading,
    ) -> Result<(), StageError> {
        let mut valuation = None;
        let mut attempt = 1;
        loop {
            match handle.submit(valuation).await {
                Ok(_) => return Ok(()),
                Err(StageError::Gate(GateError::InvalidFreshness(raw)))
                    if valuation.is_none() =>
                {
                    // Same correction an operator makes by typing a score in range.
                    let corrected = raw.clamp(0, 100);
                    info!(
                        reading = pending.reading.id,
                        raw,
                        corrected,
                        "Overriding freshness"
                    );
                    valuation = Some(Valuation::new(pending.valuation.price, corrected));
                }
                Err(e) => {
                    if !self.retry_after(attempt, "storage reading", &e).await {
                        return Err(e);
                    }
                    attempt += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn at_least_one_attempt() {
        let operator = Operator::new(0, Duration::ZERO, Route::Charity);
        assert_eq!(operator.submit_attempts(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn retry_after_sleeps_until_attempts_run_out() {
        let operator = Operator::new(3, Duration::from_secs(2), Route::Charity);
        let started = tokio::time::Instant::now();
        assert!(operator.retry_after(1, "test", &"boom").await);
        assert!(operator.retry_after(2, "test", &"boom").await);
        assert!(!operator.retry_after(3, "test", &"boom").await);
        assert_eq!(started.elapsed(), Duration::from_secs(4));
    }
}
