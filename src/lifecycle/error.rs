use crate::model::{AppleId, Stage};
use crate::services::ServiceError;
use crate::stages::StageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Cannot move from {from} to {to}")]
    InvalidTransition { from: Stage, to: Stage },
    #[error("{0} requires an apple id")]
    MissingAppleId(Stage),
    #[error("Record for {0} disappeared")]
    RecordMissing(AppleId),
    #[error(transparent)]
    Stage(#[from] StageError),
    #[error(transparent)]
    Service(#[from] ServiceError),
}
