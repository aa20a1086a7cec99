//! Apple record logic: the ledger entity, its actions and its invariants.

mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;

use crate::clients::AppleClient;
use crate::ledger::LedgerActor;
use crate::model::AppleRecord;

/// Creates a new apple ledger actor and its client.
pub fn new() -> (LedgerActor<AppleRecord>, AppleClient) {
    let (actor, generic_client) = LedgerActor::new(32);
    let client = AppleClient::new(generic_client);

    (actor, client)
}
