//! Error types for the apple ledger.

use crate::model::AppleId;
use thiserror::Error;

/// Errors raised while creating or extending an apple record.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AppleError {
    /// The requested apple was not found.
    #[error("Apple not found: {0}")]
    NotFound(String),

    /// The harvest payload is unusable.
    #[error("Invalid harvest data: {0}")]
    InvalidHarvest(String),

    #[error("Transport already logged for {0}")]
    TransportAlreadyLogged(AppleId),

    /// Storage readings need a completed transit first.
    #[error("Transport not logged for {0}")]
    TransportMissing(AppleId),

    #[error("Invalid transport window: start {start}, end {end}")]
    InvalidTransport { start: i64, end: i64 },

    #[error("{0} is already sold")]
    AlreadySold(AppleId),

    #[error("Price must be greater than zero")]
    InvalidPrice,

    /// An error occurred while communicating with the ledger actor.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<String> for AppleError {
    fn from(msg: String) -> Self {
        AppleError::ActorCommunicationError(msg)
    }
}
