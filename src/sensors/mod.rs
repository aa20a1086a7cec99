//! Synthetic sensor generators.
//!
//! Every generator takes the random source as a parameter, so production code passes
//! `rand::thread_rng()` and tests pass a seeded `StdRng`.

pub mod harvest;
pub mod transit;
pub mod warehouse;

pub use transit::{
    JourneyInfo, JourneyMetrics, SpoilageLevel, TransitPhase, TransitReading, TransportJourney,
};
