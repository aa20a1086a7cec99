//! Lifecycle orchestration: stage transitions, the automatic operator and process wiring.

pub mod error;
pub mod operator;
pub mod system;
pub mod tracing;
pub mod tracker;

pub use error::LifecycleError;
pub use operator::Operator;
pub use system::SupplyChainSystem;
pub use tracker::{LifecycleReport, LifecycleSettings, LifecycleTracker, QUICK_SALE_BUYER};
