//! # Sequential Reading Gate
//!
//! At most one warehouse reading is in flight at any time. A reading is staged, priced,
//! submitted, and only once the service accepted it may the next one be generated.
//!
//! ```text
//!            stage()                commit()
//!   Idle ─────────────▶ Pending ───────────────▶ Idle
//!     │                    │
//!     │ complete()         │ commit() of a spoiled reading
//!     ▼                    ▼
//!   Finished(Completed)  Halted ──remediate(route)──▶ Finished(route)
//! ```
//!
//! A failed submit leaves the gate `Pending` so the same reading can be resubmitted.

use crate::model::{
    FreshnessScore, Route, StorageReading, StorageSubmission, Valuation, WarehouseSample,
};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GateState {
    Idle,
    Pending,
    /// Spoilage detected and committed; waiting for a remediation route.
    Halted,
    Finished(Route),
}

impl fmt::Display for GateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateState::Idle => f.write_str("NO_PENDING"),
            GateState::Pending => f.write_str("PENDING_APPROVAL"),
            GateState::Halted => f.write_str("HALTED"),
            GateState::Finished(route) => write!(f, "FINISHED({route})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateError {
    #[error("Cannot generate a reading while {0}")]
    NotReady(GateState),

    #[error("No pending reading")]
    NoPending,

    #[error("Freshness score {0} is outside 0..=100")]
    InvalidFreshness(i64),

    #[error("Price must be greater than zero")]
    InvalidPrice,

    /// A commit named a different reading than the one pending.
    #[error("Pending reading is #{expected}, got #{got}")]
    StaleSubmission { expected: u32, got: u32 },

    #[error("Remediation needs a halted gate, gate is {0}")]
    NotHalted(GateState),

    #[error("{0} is not a remediation route")]
    InvalidRoute(Route),
}

/// A staged reading with the valuation predicted for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PendingReading {
    pub reading: StorageReading,
    pub valuation: Valuation,
}

/// Where the readings are taken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Site {
    pub location: String,
    pub state: String,
}

impl Default for Site {
    fn default() -> Self {
        Self {
            location: "Main Warehouse".into(),
            state: "WAREHOUSE".into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReadingGate {
    threshold: u32,
    site: Site,
    assigned: u32,
    committed: u32,
    pending: Option<PendingReading>,
    spoiled: bool,
    finished: Option<Route>,
}

impl ReadingGate {
    /// `threshold` is the ethylene level, in ppm, at which a reading counts as spoiled.
    pub fn new(threshold: u32, site: Site) -> Self {
        Self {
            threshold,
            site,
            assigned: 0,
            committed: 0,
            pending: None,
            spoiled: false,
            finished: None,
        }
    }

    pub fn state(&self) -> GateState {
        if let Some(route) = self.finished {
            GateState::Finished(route)
        } else if self.pending.is_some() {
            GateState::Pending
        } else if self.spoiled {
            GateState::Halted
        } else {
            GateState::Idle
        }
    }

    pub fn can_generate(&self) -> bool {
        self.state() == GateState::Idle
    }

    pub fn is_spoiled(&self) -> bool {
        self.spoiled
    }

    pub fn pending(&self) -> Option<&PendingReading> {
        self.pending.as_ref()
    }

    /// Number the next staged reading will carry. Reading numbers start at 1.
    pub fn next_reading_number(&self) -> u32 {
        self.assigned + 1
    }

    pub fn committed(&self) -> u32 {
        self.committed
    }

    /// Stages a new reading. Only allowed while idle.
    pub fn stage(
        &mut self,
        sample: WarehouseSample,
        valuation: Valuation,
        timestamp: i64,
    ) -> Result<PendingReading, GateError> {
        if !self.can_generate() {
            return Err(GateError::NotReady(self.state()));
        }

        self.assigned += 1;
        let spoilage_risk = sample.ethylene >= self.threshold;
        let pending = PendingReading {
            reading: StorageReading {
                id: self.assigned,
                temperature: sample.temperature,
                ethylene: sample.ethylene,
                timestamp,
                location: self.site.location.clone(),
                state: self.site.state.clone(),
                spoilage_risk,
            },
            valuation,
        };
        if spoilage_risk {
            self.spoiled = true;
        }
        self.pending = Some(pending.clone());
        Ok(pending)
    }

    /// Builds the payload for the pending reading. `valuation` overrides the prediction.
    pub fn submission(
        &self,
        valuation: Option<Valuation>,
    ) -> Result<StorageSubmission, GateError> {
        let pending = self.pending.as_ref().ok_or(GateError::NoPending)?;
        let valuation = valuation.unwrap_or(pending.valuation);
        let freshness_score = FreshnessScore::try_from(valuation.freshness)
            .map_err(|e| GateError::InvalidFreshness(e.0))?;
        if valuation.price == 0 {
            return Err(GateError::InvalidPrice);
        }
        Ok(StorageSubmission {
            reading: pending.reading.clone(),
            price: valuation.price,
            freshness_score,
        })
    }

    /// Marks the pending reading as accepted by the service.
    pub fn commit(&mut self, submission: &StorageSubmission) -> Result<(), GateError> {
        let pending = self.pending.as_ref().ok_or(GateError::NoPending)?;
        if pending.reading.id != submission.reading.id {
            return Err(GateError::StaleSubmission {
                expected: pending.reading.id,
                got: submission.reading.id,
            });
        }
        self.pending = None;
        self.committed += 1;
        Ok(())
    }

    /// Ends a halted gate with the chosen remediation.
    pub fn remediate(&mut self, route: Route) -> Result<(), GateError> {
        if self.state() != GateState::Halted {
            return Err(GateError::NotHalted(self.state()));
        }
        if !route.is_remediation() {
            return Err(GateError::InvalidRoute(route));
        }
        self.finished = Some(route);
        Ok(())
    }

    /// Ends an idle gate normally.
    pub fn complete(&mut self) -> Result<(), GateError> {
        if self.state() != GateState::Idle {
            return Err(GateError::NotReady(self.state()));
        }
        self.finished = Some(Route::Completed);
        Ok(())
    }

    pub fn finished(&self) -> Option<Route> {
        self.finished
    }
}
