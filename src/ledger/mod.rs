//! Generic append-only record ledger built on the actor model.
//!
//! A [`LedgerActor`] owns a set of records and serializes every operation through its
//! mailbox. It stands in for the contract that owns the authoritative apple records when
//! the lifecycle runs without a remote backend.
//!
//! # Main Components
//!
//! - [`LedgerEntity`] - Trait that record types implement
//! - [`LedgerActor`] - Actor owning the records
//! - [`LedgerClient`] - Typed handle sending requests to the actor
//! - [`LedgerReader`] - Read-side defaults for record-specific clients
//! - [`LedgerError`] - Plumbing errors
//!
//! # Testing
//!
//! See [`mock`] for an expectation-driven client that needs no running actor.

pub mod actor;
pub mod client;
pub mod entity;
pub mod error;
pub mod message;
pub mod mock;
pub mod reader;

pub use actor::LedgerActor;
pub use client::LedgerClient;
pub use entity::LedgerEntity;
pub use error::LedgerError;
pub use message::{LedgerRequest, Response};
pub use reader::LedgerReader;
