//! # Ledger Errors
//!
//! Plumbing failures shared by every record actor. Domain failures raised by an entity
//! travel inside [`LedgerError::EntityError`].

/// Errors that can occur within the ledger actor itself.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Ledger actor closed")]
    ActorClosed,
    #[error("Ledger actor dropped response channel")]
    ActorDropped,
    #[error("Record not found: {0}")]
    NotFound(String),
    #[error("Record rejected: {0}")]
    EntityError(Box<dyn std::error::Error + Send + Sync>),
}
