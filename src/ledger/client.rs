//! # Ledger Client
//!
//! Cheap-to-clone handle that forwards requests to a [`LedgerActor`](crate::ledger::LedgerActor)
//! and waits for the answer on a oneshot channel.

use crate::ledger::entity::LedgerEntity;
use crate::ledger::error::LedgerError;
use crate::ledger::message::LedgerRequest;
use tokio::sync::{mpsc, oneshot};

/// A type-safe client for a `LedgerActor<T>`.
///
/// Holds only the sender, so clones are inexpensive. The actor stops once every clone has
/// been dropped.
pub struct LedgerClient<T: LedgerEntity> {
    sender: mpsc::Sender<LedgerRequest<T>>,
}

impl<T: LedgerEntity> Clone for LedgerClient<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<T: LedgerEntity> LedgerClient<T> {
    pub fn new(sender: mpsc::Sender<LedgerRequest<T>>) -> Self {
        Self { sender }
    }

    async fn request<R>(
        &self,
        build: impl FnOnce(oneshot::Sender<Result<R, LedgerError>>) -> LedgerRequest<T>,
    ) -> Result<R, LedgerError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| LedgerError::ActorClosed)?;
        response.await.map_err(|_| LedgerError::ActorDropped)?
    }

    pub async fn create(&self, params: T::Create) -> Result<T::Id, LedgerError> {
        self.request(|respond_to| LedgerRequest::Create { params, respond_to })
            .await
    }

    pub async fn get(&self, id: T::Id) -> Result<Option<T>, LedgerError> {
        self.request(|respond_to| LedgerRequest::Get { id, respond_to })
            .await
    }

    pub async fn exists(&self, id: T::Id) -> Result<bool, LedgerError> {
        self.request(|respond_to| LedgerRequest::Exists { id, respond_to })
            .await
    }

    pub async fn next_id(&self) -> Result<u64, LedgerError> {
        self.request(|respond_to| LedgerRequest::NextId { respond_to })
            .await
    }

    pub async fn perform_action(
        &self,
        id: T::Id,
        action: T::Action,
    ) -> Result<T::ActionResult, LedgerError> {
        self.request(|respond_to| LedgerRequest::Action {
            id,
            action,
            respond_to,
        })
        .await
    }
}
