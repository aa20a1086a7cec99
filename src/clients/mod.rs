//! Record-specific clients wrapping the generic [`LedgerClient`](crate::ledger::LedgerClient).

pub mod apple_client;

pub use apple_client::AppleClient;
