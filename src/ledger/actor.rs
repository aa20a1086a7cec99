//! # Ledger Actor
//!
//! The server half of the ledger. It owns the record store and the receiving end of the
//! request channel and processes requests one at a time, so the store needs no locks.

use crate::ledger::client::LedgerClient;
use crate::ledger::entity::LedgerEntity;
use crate::ledger::error::LedgerError;
use crate::ledger::message::LedgerRequest;
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Append-only store of records of type `T`.
///
/// Ids are allocated from a counter that starts at 0 and never reuses a value, so
/// `next_id` doubles as the number of records ever created. A dashboard lists records by
/// walking `0..next_id` and asking `exists` for each id.
///
/// # Usage Pattern
///
/// 1. **Create**: `LedgerActor::new()` returns the actor and its client.
/// 2. **Wire**: pass dependencies into `actor.run(context)`.
/// 3. **Run**: spawn the run loop in a background task.
///
/// # Operations
///
/// * **Create** allocates the next id, builds the record, runs `on_create`, stores it.
/// * **Get** / **Exists** / **NextId** are read-only.
/// * **Action** runs `handle_action` on a copy of the record. The copy replaces the stored
///   record only when the action succeeds.
pub struct LedgerActor<T: LedgerEntity> {
    receiver: mpsc::Receiver<LedgerRequest<T>>,
    records: HashMap<T::Id, T>,
    next_id: u64,
}

impl<T: LedgerEntity> LedgerActor<T> {
    /// Creates a new `LedgerActor` and its associated `LedgerClient`.
    ///
    /// `buffer_size` is the request channel capacity. When the channel is full, client
    /// calls wait for space.
    pub fn new(buffer_size: usize) -> (Self, LedgerClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            records: HashMap::new(),
            next_id: 0,
        };
        (actor, LedgerClient::new(sender))
    }

    /// Runs the event loop until every client has been dropped.
    pub async fn run(mut self, context: T::Context) {
        let record_type = std::any::type_name::<T>()
            .split("::")
            .last()
            .unwrap_or("Unknown");
        info!(record_type, "Ledger started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                LedgerRequest::Create { params, respond_to } => {
                    debug!(record_type, ?params, "Create");
                    let id = T::Id::from(self.next_id);

                    match T::from_create_params(id.clone(), params) {
                        Ok(mut record) => {
                            if let Err(e) = record.on_create(&context).await {
                                warn!(record_type, error = %e, "on_create failed");
                                let _ = respond_to.send(Err(LedgerError::EntityError(Box::new(e))));
                                continue;
                            }
                            // The id is only consumed once the record is accepted.
                            self.next_id += 1;
                            self.records.insert(id.clone(), record);
                            info!(record_type, %id, size = self.records.len(), "Created");
                            let _ = respond_to.send(Ok(id));
                        }
                        Err(e) => {
                            warn!(record_type, error = %e, "Create failed");
                            let _ = respond_to.send(Err(LedgerError::EntityError(Box::new(e))));
                        }
                    }
                }
                LedgerRequest::Get { id, respond_to } => {
                    let record = self.records.get(&id).cloned();
                    debug!(record_type, %id, found = record.is_some(), "Get");
                    let _ = respond_to.send(Ok(record));
                }
                LedgerRequest::Exists { id, respond_to } => {
                    let _ = respond_to.send(Ok(self.records.contains_key(&id)));
                }
                LedgerRequest::NextId { respond_to } => {
                    let _ = respond_to.send(Ok(self.next_id));
                }
                LedgerRequest::Action {
                    id,
                    action,
                    respond_to,
                } => {
                    debug!(record_type, %id, ?action, "Action");
                    let Some(stored) = self.records.get_mut(&id) else {
                        warn!(record_type, %id, "Not found");
                        let _ = respond_to.send(Err(LedgerError::NotFound(id.to_string())));
                        continue;
                    };

                    let mut draft = stored.clone();
                    match draft.handle_action(action, &context).await {
                        Ok(result) => {
                            *stored = draft;
                            info!(record_type, %id, "Action ok");
                            let _ = respond_to.send(Ok(result));
                        }
                        Err(e) => {
                            warn!(record_type, %id, error = %e, "Action rejected");
                            let _ = respond_to.send(Err(LedgerError::EntityError(Box::new(e))));
                        }
                    }
                }
            }
        }

        info!(record_type, size = self.records.len(), "Shutdown");
    }
}
