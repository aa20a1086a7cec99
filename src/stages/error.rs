use crate::services::ServiceError;
use crate::stages::storage::gate::GateError;
use thiserror::Error;

/// Errors raised by the stage runners.
#[derive(Debug, Error)]
pub enum StageError {
    #[error("Initial price must be greater than zero")]
    InvalidInitialPrice,

    /// The transport journey was already logged successfully.
    #[error("Transport already submitted")]
    AlreadySubmitted,

    #[error("Storage monitor stopped")]
    MonitorStopped,

    #[error(transparent)]
    Gate(#[from] GateError),

    #[error(transparent)]
    Service(#[from] ServiceError),
}
