//! # Observability & Tracing
//!
//! [`setup_tracing`] installs the `tracing-subscriber` formatter for the whole process.
//!
//! ## Configuration
//!
//! Output uses the compact format without module prefixes (`with_target(false)`). Records
//! carry structured fields instead: `apple_id`, `reading`, `record_type`, `stage`.
//!
//! The level comes from `RUST_LOG` and defaults to `info`.
//!
//! ```bash
//! # Stage progress, committed readings, spoilage
//! RUST_LOG=info apple-lifecycle run
//!
//! # Every sensor sample and ledger request
//! RUST_LOG=debug apple-lifecycle run
//!
//! # Only the storage monitor in detail
//! RUST_LOG=info,apple_lifecycle::stages::storage=debug apple-lifecycle run
//! ```
//!
//! ## Storage Trace Example
//!
//! **With `RUST_LOG=info`**:
//!
//! ```text
//! INFO Created record_type="AppleRecord" id=apple_0 size=1
//! INFO Stage advanced from=HARVEST to=TRANSIT
//! INFO Transport logged apple_id=apple_0
//! INFO Initial setup completed initial_price=100
//! INFO Reading pending apple_id=apple_0 reading=1 price=100
//! INFO Reading committed apple_id=apple_0 reading=1 price=100 freshness=95/100
//! WARN Spoilage detected apple_id=apple_0 reading=7 ethylene=10
//! INFO Remediation chosen apple_id=apple_0 route=SALE
//! ```
//!
//! With `debug` the raw samples show up as well (`Sampled temperature=21 ethylene=6`).

use tracing_subscriber::EnvFilter;

pub fn setup_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false) // apple_id and record_type identify the source
        .compact()
        .init();
}
