use super::{ServiceError, SupplyChainService};
use crate::clients::AppleClient;
use crate::ledger::LedgerReader;
use crate::model::{
    AppleId, AppleRecord, CreateApple, Sale, StorageSubmission, StoreListing, TransportLog,
};
use async_trait::async_trait;

/// [`SupplyChainService`] backed by the in-process apple ledger.
#[derive(Clone)]
pub struct LedgerService {
    client: AppleClient,
}

impl LedgerService {
    pub fn new(client: AppleClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SupplyChainService for LedgerService {
    async fn create_apple(&self, harvest: CreateApple) -> Result<AppleId, ServiceError> {
        Ok(self.client.create_apple(harvest).await?)
    }

    async fn log_transport(&self, id: AppleId, log: TransportLog) -> Result<(), ServiceError> {
        Ok(self.client.log_transport(id, log).await?)
    }

    async fn process_storage_reading(
        &self,
        id: AppleId,
        submission: StorageSubmission,
    ) -> Result<(), ServiceError> {
        self.client
            .log_storage_reading(
                id,
                submission.reading,
                submission.price,
                submission.freshness_score,
            )
            .await?;
        Ok(())
    }

    async fn log_store(&self, id: AppleId, listing: StoreListing) -> Result<(), ServiceError> {
        Ok(self.client.log_store(id, listing).await?)
    }

    async fn sell_apple(&self, id: AppleId, sale: Sale) -> Result<(), ServiceError> {
        Ok(self.client.sell(id, sale).await?)
    }

    async fn get_apple(&self, id: AppleId) -> Result<Option<AppleRecord>, ServiceError> {
        Ok(self.client.get(id).await?)
    }

    async fn list_apples(&self) -> Result<Vec<AppleRecord>, ServiceError> {
        Ok(self.client.scan().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apple_actor::AppleError;
    use crate::model::{FreshnessScore, StorageReading};

    #[tokio::test]
    async fn rejections_surface_as_ledger_errors() {
        let (actor, client) = crate::apple_actor::new();
        tokio::spawn(actor.run(()));
        let service = LedgerService::new(client);

        let id = service
            .create_apple(CreateApple {
                soil_composition: "Silty".into(),
                humidity: vec![50],
                chemicals: vec![90],
            })
            .await
            .unwrap();

        let submission = StorageSubmission {
            reading: StorageReading {
                id: 0,
                temperature: 20,
                ethylene: 3,
                timestamp: 1,
                location: "Main Warehouse".into(),
                state: "WAREHOUSE".into(),
                spoilage_risk: false,
            },
            price: 100,
            freshness_score: FreshnessScore::PERFECT,
        };
        let err = service.process_storage_reading(id, submission).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Ledger(AppleError::TransportMissing(_))
        ));

        assert!(service.get_apple(AppleId(42)).await.unwrap().is_none());
        assert_eq!(service.list_apples().await.unwrap().len(), 1);
    }
}
