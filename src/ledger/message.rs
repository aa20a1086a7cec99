//! # Ledger Messages
//!
//! Requests sent from a [`LedgerClient`](crate::ledger::LedgerClient) to its
//! [`LedgerActor`](crate::ledger::LedgerActor).

use crate::ledger::entity::LedgerEntity;
use crate::ledger::error::LedgerError;
use tokio::sync::oneshot;

/// One-shot channel the actor answers on.
pub type Response<T> = oneshot::Sender<Result<T, LedgerError>>;

/// Operations an append-only ledger supports.
///
/// There is no update or delete: a record is created once and then only grows through
/// [`LedgerEntity::Action`]s, the same way a contract-backed record would. The read side
/// mirrors the calls a dashboard makes against a contract: `next_id`, `exists`, `get`.
#[derive(Debug)]
pub enum LedgerRequest<T: LedgerEntity> {
    Create {
        params: T::Create,
        respond_to: Response<T::Id>,
    },
    Get {
        id: T::Id,
        respond_to: Response<Option<T>>,
    },
    Exists {
        id: T::Id,
        respond_to: Response<bool>,
    },
    NextId {
        respond_to: Response<u64>,
    },
    Action {
        id: T::Id,
        action: T::Action,
        respond_to: Response<T::ActionResult>,
    },
}
