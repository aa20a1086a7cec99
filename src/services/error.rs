use crate::apple_actor::AppleError;
use crate::model::AppleId;
use thiserror::Error;

/// Errors from a supply-chain service or the price predictor.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{path} returned status {status}")]
    Status { path: String, status: u16 },

    /// The service answered but refused the operation.
    #[error("Rejected: {0}")]
    Rejected(String),

    #[error("Apple not found: {0}")]
    NotFound(AppleId),

    #[error("Service did not report the new apple id")]
    MissingAppleId,

    #[error("Price prediction failed: {0}")]
    Prediction(String),

    #[error(transparent)]
    Ledger(#[from] AppleError),
}
