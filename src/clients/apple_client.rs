use crate::apple_actor::{AppleAction, AppleActionResult, AppleError};
use crate::ledger::{LedgerClient, LedgerError, LedgerReader};
use crate::model::{
    AppleId, AppleRecord, CreateApple, FreshnessScore, Sale, StorageReading, StoreListing,
    TransportLog,
};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Client for interacting with the apple ledger actor.
#[derive(Clone)]
pub struct AppleClient {
    inner: LedgerClient<AppleRecord>,
}

impl AppleClient {
    pub fn new(inner: LedgerClient<AppleRecord>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl LedgerReader<AppleRecord> for AppleClient {
    type Error = AppleError;

    fn inner(&self) -> &LedgerClient<AppleRecord> {
        &self.inner
    }

    /// Entity rejections are unwrapped back into the `AppleError` that caused them.
    fn map_error(e: LedgerError) -> Self::Error {
        match e {
            LedgerError::NotFound(id) => AppleError::NotFound(id),
            LedgerError::EntityError(inner) => match inner.downcast::<AppleError>() {
                Ok(apple_error) => *apple_error,
                Err(other) => AppleError::ActorCommunicationError(other.to_string()),
            },
            other => AppleError::ActorCommunicationError(other.to_string()),
        }
    }
}

fn unexpected(result: AppleActionResult) -> AppleError {
    AppleError::ActorCommunicationError(format!("Unexpected action result: {result:?}"))
}

impl AppleClient {
    #[instrument(skip(self))]
    pub async fn create_apple(&self, harvest: CreateApple) -> Result<AppleId, AppleError> {
        debug!("Sending request");
        self.inner.create(harvest).await.map_err(Self::map_error)
    }

    #[instrument(skip(self, log), fields(apple_id = %id))]
    pub async fn log_transport(&self, id: AppleId, log: TransportLog) -> Result<(), AppleError> {
        debug!(?log, "Sending request");
        match self
            .inner
            .perform_action(id, AppleAction::LogTransport(log))
            .await
            .map_err(Self::map_error)?
        {
            AppleActionResult::LogTransport(()) => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    /// Appends a warehouse reading and returns the number of logs now stored.
    #[instrument(skip(self, reading), fields(apple_id = %id, reading = reading.id))]
    pub async fn log_storage_reading(
        &self,
        id: AppleId,
        reading: StorageReading,
        price: u64,
        freshness: FreshnessScore,
    ) -> Result<usize, AppleError> {
        debug!("Sending request");
        let action = AppleAction::LogStorageReading {
            reading,
            price,
            freshness,
        };
        match self
            .inner
            .perform_action(id, action)
            .await
            .map_err(Self::map_error)?
        {
            AppleActionResult::LogStorageReading(count) => Ok(count),
            other => Err(unexpected(other)),
        }
    }

    #[instrument(skip(self), fields(apple_id = %id))]
    pub async fn log_store(&self, id: AppleId, listing: StoreListing) -> Result<(), AppleError> {
        debug!("Sending request");
        match self
            .inner
            .perform_action(id, AppleAction::LogStore(listing))
            .await
            .map_err(Self::map_error)?
        {
            AppleActionResult::LogStore(()) => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    #[instrument(skip(self), fields(apple_id = %id))]
    pub async fn sell(&self, id: AppleId, sale: Sale) -> Result<(), AppleError> {
        debug!("Sending request");
        match self
            .inner
            .perform_action(id, AppleAction::Sell(sale))
            .await
            .map_err(Self::map_error)?
        {
            AppleActionResult::Sell(()) => Ok(()),
            other => Err(unexpected(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::mock::{create_mock_client, expect_action, MockLedger};

    fn harvest() -> CreateApple {
        CreateApple {
            soil_composition: "Clay".into(),
            humidity: vec![60],
            chemicals: vec![44],
        }
    }

    #[tokio::test]
    async fn entity_errors_are_unwrapped() {
        let mut mock = MockLedger::<AppleRecord>::new();
        mock.expect_action().return_err(LedgerError::EntityError(Box::new(
            AppleError::TransportMissing(AppleId(2)),
        )));
        mock.expect_action()
            .return_err(LedgerError::NotFound("apple_9".into()));

        let client = AppleClient::new(mock.client());
        let listing = StoreListing {
            ethylene_level: 4,
            freshness_score: FreshnessScore::PERFECT,
            timestamp: 1,
        };
        assert_eq!(
            client.log_store(AppleId(2), listing.clone()).await,
            Err(AppleError::TransportMissing(AppleId(2)))
        );
        assert_eq!(
            client.log_store(AppleId(9), listing).await,
            Err(AppleError::NotFound("apple_9".into()))
        );
        mock.verify();
    }

    #[tokio::test]
    async fn mismatched_result_is_reported() {
        let mut mock = MockLedger::<AppleRecord>::new();
        mock.expect_action()
            .return_ok(AppleActionResult::LogStore(()));

        let client = AppleClient::new(mock.client());
        let sale = Sale {
            buyer: "b".into(),
            price: 1,
        };
        let err = client.sell(AppleId(0), sale).await.unwrap_err();
        assert!(matches!(err, AppleError::ActorCommunicationError(_)));
    }

    #[tokio::test]
    async fn sell_sends_sale_action() {
        let (generic, mut receiver) = create_mock_client::<AppleRecord>(4);
        let client = AppleClient::new(generic);

        let task = tokio::spawn(async move {
            client
                .sell(
                    AppleId(5),
                    Sale {
                        buyer: "quick-sale".into(),
                        price: 70,
                    },
                )
                .await
        });

        let (id, action, responder) = expect_action(&mut receiver).await.unwrap();
        assert_eq!(id, AppleId(5));
        assert!(matches!(action, AppleAction::Sell(Sale { price: 70, .. })));
        responder.send(Ok(AppleActionResult::Sell(()))).unwrap();
        assert_eq!(task.await.unwrap(), Ok(()));
    }

    #[tokio::test]
    async fn real_actor_round_trip() {
        let (actor, client) = crate::apple_actor::new();
        let handle = tokio::spawn(actor.run(()));

        let id = client.create_apple(harvest()).await.unwrap();
        assert_eq!(id, AppleId(0));
        assert_eq!(client.next_id().await.unwrap(), 1);
        let record = client.get(id).await.unwrap().unwrap();
        assert_eq!(record.harvest.soil_composition, "Clay");

        let all = client.scan().await.unwrap();
        assert_eq!(all.len(), 1);

        drop(client);
        handle.await.unwrap();
    }
}
