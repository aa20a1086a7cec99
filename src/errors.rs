//! Top-level error type for the binary and anything that spans modules.

use crate::config::ConfigError;
use crate::lifecycle::LifecycleError;
use crate::services::ServiceError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Lifecycle failed: {0}")]
    Lifecycle(#[from] LifecycleError),
    #[error("Service error: {0}")]
    Service(#[from] ServiceError),
    #[error("Shutdown failed: {0}")]
    Shutdown(String),
}
