//! # LedgerReader Trait
//!
//! Read-side defaults shared by record-specific clients: `get`, `exists`, `next_id` and a
//! full scan, all built on the wrapped [`LedgerClient`].

use crate::ledger::{LedgerClient, LedgerEntity, LedgerError};
use async_trait::async_trait;
use tracing::warn;

/// Trait for record-specific clients to inherit the read operations.
#[async_trait]
pub trait LedgerReader<T: LedgerEntity>: Send + Sync {
    /// The record-specific error type.
    type Error: Send + Sync;

    /// Access the inner generic client.
    fn inner(&self) -> &LedgerClient<T>;

    /// Map ledger errors to the record error type.
    fn map_error(e: LedgerError) -> Self::Error;

    /// Fetch a record by id.
    #[tracing::instrument(skip(self))]
    async fn get(&self, id: T::Id) -> Result<Option<T>, Self::Error> {
        tracing::debug!("Sending request");
        self.inner().get(id).await.map_err(Self::map_error)
    }

    /// Whether a record with this id was created.
    #[tracing::instrument(skip(self))]
    async fn exists(&self, id: T::Id) -> Result<bool, Self::Error> {
        self.inner().exists(id).await.map_err(Self::map_error)
    }

    /// The id the next created record will receive.
    async fn next_id(&self) -> Result<u64, Self::Error> {
        self.inner().next_id().await.map_err(Self::map_error)
    }

    /// Walks `0..next_id` and collects every existing record.
    ///
    /// A failure while reading one id is logged and skipped; only a failure to read the
    /// counter itself aborts the scan.
    async fn scan(&self) -> Result<Vec<T>, Self::Error> {
        let upper = self.next_id().await?;
        let mut records = Vec::new();
        for raw in 0..upper {
            let id = T::Id::from(raw);
            match self.inner().exists(id.clone()).await {
                Ok(true) => match self.inner().get(id.clone()).await {
                    Ok(Some(record)) => records.push(record),
                    Ok(None) => {}
                    Err(e) => warn!(%id, error = %e, "Skipping unreadable record"),
                },
                Ok(false) => {}
                Err(e) => warn!(%id, error = %e, "Skipping unreadable record"),
            }
        }
        Ok(records)
    }
}
