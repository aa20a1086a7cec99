//! # Apple Lifecycle
//!
//! > **A simulated supply chain for a perishable good, driven by actors.**
//!
//! One apple is followed from the orchard to the shop shelf. Each stage samples synthetic
//! sensors on a timer and records what it saw in a ledger, either the in-process
//! [`LedgerActor`](ledger::LedgerActor) or a remote backend over HTTP.
//!
//! ## 🍎 Lifecycle
//!
//! ```text
//! HARVEST ──> TRANSIT ──> STORAGE ──> DONE
//!  5 × 9 s     3 × 3 s     every 60 s, one reading at a time
//! ```
//!
//! - **Harvest** collects soil, humidity and chemical readings, then creates the record.
//! - **Transit** simulates a truck journey and logs it exactly once.
//! - **Storage** takes warehouse readings until ethylene reaches the spoilage threshold.
//!   Each reading is priced by the predictor and must be committed before the next one is
//!   generated. After spoilage the apple is routed to charity, a cold chamber or a quick
//!   sale.
//!
//! ## 🏗️ Design Notes
//!
//! ### 1. One Generic Ledger
//! [`LedgerActor<T>`](ledger::LedgerActor) owns records of any [`LedgerEntity`](ledger::LedgerEntity).
//! The apple's rules (single transport, transport before storage, nothing after sale) live
//! in [`apple_actor`], not in the message loop.
//!
//! ### 2. The Reading Gate
//! [`ReadingGate`](stages::storage::gate::ReadingGate) is a plain state machine with no
//! I/O. The storage monitor task owns it, so "at most one pending reading" holds without
//! locks.
//!
//! ### 3. Swappable Backends
//! Stages only see [`SupplyChainService`](services::SupplyChainService) and
//! [`PricePredictor`](services::PricePredictor). Tests and offline runs use the ledger
//! and a fixed predictor. Live runs talk HTTP through `reqwest`.
//!
//! ### 4. Observability
//! `tracing` everywhere with structured fields. See [`lifecycle::tracing`].
//!
//! ## 🗺️ Module Tour
//!
//! - [`ledger`]: generic record actor, client, reader trait and mocks.
//! - [`model`]: apple records, readings, stages and routes.
//! - [`apple_actor`] / [`clients`]: the apple entity and its typed client.
//! - [`sensors`]: synthetic harvest, transit and warehouse data.
//! - [`services`]: ledger-backed and HTTP backends, the price predictor.
//! - [`stages`]: harvest, transit and storage runners.
//! - [`lifecycle`]: stage ordering, the automatic operator, process wiring.
//! - [`viewer`]: list and detail views.
//! - [`config`]: TOML configuration with environment overrides.
//!
//! ## 🚀 Quick Start
//!
//! ```bash
//! # Full lifecycle against the in-process ledger
//! RUST_LOG=info cargo run -- run
//!
//! # Inspect records on a running backend
//! cargo run -- --backend http list
//! cargo run -- --backend http show 3
//! ```

pub mod apple_actor;
pub mod clients;
pub mod config;
pub mod errors;
pub mod ledger;
pub mod lifecycle;
pub mod model;
pub mod sensors;
pub mod services;
pub mod stages;
pub mod viewer;

pub use errors::{Error, Result};
