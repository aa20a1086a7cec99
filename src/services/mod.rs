//! # Supply-Chain Services
//!
//! The lifecycle never talks to storage directly. It goes through [`SupplyChainService`],
//! which has two implementations:
//!
//! - [`LedgerService`] - the in-process apple ledger actor
//! - [`BackendClient`] - the HTTP backend that relays calls to the contract
//!
//! Price and freshness for storage readings come from a [`PricePredictor`]: the HTTP
//! [`PredictorClient`] or the offline [`FixedPredictor`].

pub mod backend;
pub mod error;
pub mod ledger_service;
pub mod predictor;

pub use backend::{BackendClient, ShelfItem};
pub use error::ServiceError;
pub use ledger_service::LedgerService;
pub use predictor::{FixedPredictor, PricePredictor, PredictorClient};

use crate::model::{
    AppleId, AppleRecord, CreateApple, Sale, StorageSubmission, StoreListing, TransportLog,
};
use async_trait::async_trait;

/// Operations the lifecycle and the viewer perform against the record store.
#[async_trait]
pub trait SupplyChainService: Send + Sync {
    /// Creates the record from harvest data and returns its id.
    async fn create_apple(&self, harvest: CreateApple) -> Result<AppleId, ServiceError>;

    async fn log_transport(&self, id: AppleId, log: TransportLog) -> Result<(), ServiceError>;

    /// Logs one warehouse reading with its price and freshness.
    async fn process_storage_reading(
        &self,
        id: AppleId,
        submission: StorageSubmission,
    ) -> Result<(), ServiceError>;

    async fn log_store(&self, id: AppleId, listing: StoreListing) -> Result<(), ServiceError>;

    async fn sell_apple(&self, id: AppleId, sale: Sale) -> Result<(), ServiceError>;

    /// `Ok(None)` when no such apple exists.
    async fn get_apple(&self, id: AppleId) -> Result<Option<AppleRecord>, ServiceError>;

    async fn list_apples(&self) -> Result<Vec<AppleRecord>, ServiceError>;
}
