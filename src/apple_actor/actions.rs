//! Custom actions for the apple ledger.
//!
//! Each action appends to an existing [`AppleRecord`](crate::model::AppleRecord). They are
//! handled by [`LedgerEntity::handle_action`](crate::ledger::LedgerEntity::handle_action).

use crate::model::{FreshnessScore, Sale, StorageReading, StoreListing, TransportLog};

/// Operations that extend an apple record after harvest.
#[derive(Debug, Clone)]
pub enum AppleAction {
    /// Records the transit journey. Allowed once.
    LogTransport(TransportLog),
    /// Appends a warehouse reading together with its price and freshness.
    ///
    /// # Errors
    /// Fails when transport was never logged, the apple is sold, or the price is zero.
    LogStorageReading {
        reading: StorageReading,
        price: u64,
        freshness: FreshnessScore,
    },
    /// Lists the apple in the store.
    LogStore(StoreListing),
    /// Sells the apple. No action is accepted afterwards.
    Sell(Sale),
}

/// Results from AppleActions - variants match 1:1 with AppleAction
#[derive(Debug, Clone, PartialEq)]
pub enum AppleActionResult {
    LogTransport(()),
    /// Number of warehouse logs after the append.
    LogStorageReading(usize),
    LogStore(()),
    Sell(()),
}
