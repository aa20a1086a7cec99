//! # Mock Ledger & Testing Guide
//!
//! `MockLedger<T>` hands out a real [`LedgerClient<T>`] whose requests are answered from a
//! queue of expectations instead of a running [`LedgerActor`](crate::ledger::LedgerActor).
//! Use it to test the logic wrapped around a client, including failures that are awkward
//! to provoke against real records.
//!
//! | | MockLedger | Real actor |
//! |---|---|---|
//! | **State** | None, answers are scripted | Real records |
//! | **Error injection** | `return_err` | Needs a record in the right state |
//! | **Use case** | Client wrappers, services | Entity rules, full lifecycle |
//!
//! ```rust,ignore
//! let mut mock = MockLedger::<AppleRecord>::new();
//! mock.expect_action().return_err(LedgerError::ActorClosed);
//! let client = AppleClient::new(mock.client());
//! assert!(client.log_transport(AppleId(0), log).await.is_err());
//! mock.verify();
//! ```
//!
//! For step-by-step control, [`create_mock_client`] returns the raw receiver and
//! [`expect_action`] / [`expect_create`] pull the next request off it.

use crate::ledger::client::LedgerClient;
use crate::ledger::entity::LedgerEntity;
use crate::ledger::error::LedgerError;
use crate::ledger::message::LedgerRequest;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, oneshot};

enum Expectation<T: LedgerEntity> {
    Create(Result<T::Id, LedgerError>),
    Get(Result<Option<T>, LedgerError>),
    Exists(Result<bool, LedgerError>),
    NextId(Result<u64, LedgerError>),
    Action(Result<T::ActionResult, LedgerError>),
}

type Queue<T> = Arc<Mutex<VecDeque<Expectation<T>>>>;

/// A scripted ledger for tests.
///
/// Expectations are consumed in order. A request that does not match the next
/// expectation panics the background task, which surfaces in the test as
/// `LedgerError::ActorDropped`.
pub struct MockLedger<T: LedgerEntity> {
    client: LedgerClient<T>,
    expectations: Queue<T>,
    _handle: tokio::task::JoinHandle<()>,
}

impl<T: LedgerEntity> Default for MockLedger<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: LedgerEntity> MockLedger<T> {
    /// Creates a mock with no expectations. Must be called inside a Tokio runtime.
    pub fn new() -> Self {
        let (sender, mut receiver) = mpsc::channel::<LedgerRequest<T>>(64);
        let expectations: Queue<T> = Arc::new(Mutex::new(VecDeque::new()));
        let queue = expectations.clone();

        let handle = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                let next = queue.lock().ok().and_then(|mut q| q.pop_front());
                match (request, next) {
                    (LedgerRequest::Create { respond_to, .. }, Some(Expectation::Create(r))) => {
                        let _ = respond_to.send(r);
                    }
                    (LedgerRequest::Get { respond_to, .. }, Some(Expectation::Get(r))) => {
                        let _ = respond_to.send(r);
                    }
                    (LedgerRequest::Exists { respond_to, .. }, Some(Expectation::Exists(r))) => {
                        let _ = respond_to.send(r);
                    }
                    (LedgerRequest::NextId { respond_to }, Some(Expectation::NextId(r))) => {
                        let _ = respond_to.send(r);
                    }
                    (LedgerRequest::Action { respond_to, .. }, Some(Expectation::Action(r))) => {
                        let _ = respond_to.send(r);
                    }
                    _ => panic!("Unexpected ledger request or expectation mismatch"),
                }
            }
        });

        Self {
            client: LedgerClient::new(sender),
            expectations,
            _handle: handle,
        }
    }

    /// Returns a client wired to this mock.
    pub fn client(&self) -> LedgerClient<T> {
        self.client.clone()
    }

    pub fn expect_create(&mut self) -> ExpectationBuilder<T, T::Id> {
        ExpectationBuilder::new(self.expectations.clone(), Expectation::Create)
    }

    pub fn expect_get(&mut self) -> ExpectationBuilder<T, Option<T>> {
        ExpectationBuilder::new(self.expectations.clone(), Expectation::Get)
    }

    pub fn expect_exists(&mut self) -> ExpectationBuilder<T, bool> {
        ExpectationBuilder::new(self.expectations.clone(), Expectation::Exists)
    }

    pub fn expect_next_id(&mut self) -> ExpectationBuilder<T, u64> {
        ExpectationBuilder::new(self.expectations.clone(), Expectation::NextId)
    }

    pub fn expect_action(&mut self) -> ExpectationBuilder<T, T::ActionResult> {
        ExpectationBuilder::new(self.expectations.clone(), Expectation::Action)
    }

    /// Panics if any expectation was not consumed.
    pub fn verify(&self) {
        let remaining = self.expectations.lock().map(|q| q.len()).unwrap_or(0);
        if remaining > 0 {
            panic!("Not all expectations were met. {remaining} remaining");
        }
    }
}

/// Fluent builder queuing one expectation.
pub struct ExpectationBuilder<T: LedgerEntity, R> {
    queue: Queue<T>,
    wrap: fn(Result<R, LedgerError>) -> Expectation<T>,
}

impl<T: LedgerEntity, R> ExpectationBuilder<T, R> {
    fn new(queue: Queue<T>, wrap: fn(Result<R, LedgerError>) -> Expectation<T>) -> Self {
        Self { queue, wrap }
    }

    fn push(self, response: Result<R, LedgerError>) {
        if let Ok(mut q) = self.queue.lock() {
            q.push_back((self.wrap)(response));
        }
    }

    pub fn return_ok(self, value: R) {
        self.push(Ok(value));
    }

    pub fn return_err(self, error: LedgerError) {
        self.push(Err(error));
    }
}

/// Creates a client and the receiver its requests arrive on.
pub fn create_mock_client<T: LedgerEntity>(
    buffer_size: usize,
) -> (LedgerClient<T>, mpsc::Receiver<LedgerRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (LedgerClient::new(sender), receiver)
}

/// Pulls the next request and returns it if it is a `Create`.
pub async fn expect_create<T: LedgerEntity>(
    receiver: &mut mpsc::Receiver<LedgerRequest<T>>,
) -> Option<(T::Create, oneshot::Sender<Result<T::Id, LedgerError>>)> {
    match receiver.recv().await {
        Some(LedgerRequest::Create { params, respond_to }) => Some((params, respond_to)),
        _ => None,
    }
}

/// Pulls the next request and returns it if it is an `Action`.
pub async fn expect_action<T: LedgerEntity>(
    receiver: &mut mpsc::Receiver<LedgerRequest<T>>,
) -> Option<(
    T::Id,
    T::Action,
    oneshot::Sender<Result<T::ActionResult, LedgerError>>,
)> {
    match receiver.recv().await {
        Some(LedgerRequest::Action {
            id,
            action,
            respond_to,
        }) => Some((id, action, respond_to)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::LedgerActor;
    use async_trait::async_trait;

    #[derive(Clone, Debug, PartialEq)]
    struct Bin {
        id: u64,
        weight: u32,
    }

    #[derive(Debug)]
    struct BinCreate {
        weight: u32,
    }

    #[derive(Debug)]
    enum BinAction {
        Add(u32),
    }

    #[derive(Debug, thiserror::Error)]
    #[error("crate overloaded")]
    struct Overloaded;

    #[async_trait]
    impl LedgerEntity for Bin {
        type Id = u64;
        type Create = BinCreate;
        type Action = BinAction;
        type ActionResult = u32;
        type Context = ();
        type Error = Overloaded;

        fn from_create_params(id: u64, params: BinCreate) -> Result<Self, Self::Error> {
            Ok(Self {
                id,
                weight: params.weight,
            })
        }

        async fn handle_action(&mut self, action: BinAction, _: &()) -> Result<u32, Overloaded> {
            match action {
                BinAction::Add(w) => {
                    // Mutates before rejecting; the actor must discard the draft.
                    self.weight += w;
                    if self.weight > 100 {
                        return Err(Overloaded);
                    }
                    Ok(self.weight)
                }
            }
        }
    }

    #[tokio::test]
    async fn ids_start_at_zero_and_rejected_actions_leave_record_untouched() {
        let (actor, client) = LedgerActor::<Bin>::new(8);
        tokio::spawn(actor.run(()));

        let first = client.create(BinCreate { weight: 10 }).await.unwrap();
        let second = client.create(BinCreate { weight: 20 }).await.unwrap();
        assert_eq!((first, second), (0, 1));
        assert_eq!(client.next_id().await.unwrap(), 2);
        assert!(client.exists(1).await.unwrap());
        assert!(!client.exists(2).await.unwrap());

        assert_eq!(client.perform_action(0, BinAction::Add(5)).await.unwrap(), 15);
        let rejected = client.perform_action(0, BinAction::Add(500)).await;
        assert!(matches!(rejected, Err(LedgerError::EntityError(_))));
        assert_eq!(client.get(0).await.unwrap().unwrap().weight, 15);

        let missing = client.perform_action(9, BinAction::Add(1)).await;
        assert!(matches!(missing, Err(LedgerError::NotFound(_))));
    }

    #[tokio::test]
    async fn raw_receiver_exposes_requests() {
        let (client, mut receiver) = create_mock_client::<Bin>(4);
        let task = tokio::spawn(async move { client.create(BinCreate { weight: 7 }).await });

        let (params, responder) = expect_create(&mut receiver).await.expect("create request");
        assert_eq!(params.weight, 7);
        responder.send(Ok(3)).unwrap();
        assert_eq!(task.await.unwrap().unwrap(), 3);
    }

    #[tokio::test]
    async fn scripted_expectations_are_consumed_in_order() {
        let mut mock = MockLedger::<Bin>::new();
        mock.expect_next_id().return_ok(1);
        mock.expect_action().return_err(LedgerError::ActorClosed);

        let client = mock.client();
        assert_eq!(client.next_id().await.unwrap(), 1);
        let err = client.perform_action(0, BinAction::Add(1)).await;
        assert!(matches!(err, Err(LedgerError::ActorClosed)));
        mock.verify();
    }
}
