//! # LedgerEntity Trait
//!
//! The contract a record type implements to be stored by a [`LedgerActor`](crate::ledger::LedgerActor).
//!
//! Records are append-only. They are created from a `Create` payload and afterwards
//! change only through domain `Action`s (log transport, append a storage reading, sell).
//! The actor applies each action to a copy of the record and keeps the copy only when
//! the action succeeds, so a rejected action never leaves a half-written record behind.

use async_trait::async_trait;
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Trait that any record must implement to be managed by a `LedgerActor`.
///
/// # Async & Context
/// Hooks are async so an entity can consult other actors while validating. The `Context`
/// type is injected into `run()`, which lets dependencies be wired after construction.
#[async_trait]
pub trait LedgerEntity: Clone + Send + Sync + 'static {
    /// Record identifier. Built from the ledger's sequential counter, which starts at 0.
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug + From<u64>;

    /// Payload that creates a record.
    type Create: Send + Sync + Debug;

    /// Domain operations that append to an existing record.
    type Action: Send + Sync + Debug;

    /// Value returned by a successful action.
    type ActionResult: Send + Sync + Debug;

    /// Runtime dependencies injected into the actor. Use `()` when there are none.
    type Context: Send + Sync;

    /// Domain error raised by hooks and actions.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Builds the record from its freshly allocated id and the create payload.
    fn from_create_params(id: Self::Id, params: Self::Create) -> Result<Self, Self::Error>;

    /// Called after construction and before the record is stored.
    async fn on_create(&mut self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Applies a domain action.
    async fn handle_action(
        &mut self,
        action: Self::Action,
        ctx: &Self::Context,
    ) -> Result<Self::ActionResult, Self::Error>;
}
