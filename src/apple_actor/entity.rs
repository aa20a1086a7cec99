//! LedgerEntity implementation for [`AppleRecord`].
//!
//! The rules the contract enforces live here: transport is logged once and before any
//! storage reading, prices are positive, and a sold apple is frozen.

use super::actions::{AppleAction, AppleActionResult};
use super::error::AppleError;
use crate::ledger::LedgerEntity;
use crate::model::{AppleId, AppleRecord, CreateApple, HarvestData, WarehouseLog};
use async_trait::async_trait;

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

#[async_trait]
impl LedgerEntity for AppleRecord {
    type Id = AppleId;
    type Create = CreateApple;
    type Action = AppleAction;
    type ActionResult = AppleActionResult;
    type Context = ();
    type Error = AppleError;

    /// Creates the record from a harvest, stamped with the current time.
    fn from_create_params(id: AppleId, params: CreateApple) -> Result<Self, AppleError> {
        if params.soil_composition.trim().is_empty() {
            return Err(AppleError::InvalidHarvest("missing soil composition".into()));
        }
        if params.humidity.is_empty() || params.chemicals.is_empty() {
            return Err(AppleError::InvalidHarvest("empty sensor series".into()));
        }
        let harvest = HarvestData {
            soil_composition: params.soil_composition,
            humidity: params.humidity,
            chemicals: params.chemicals,
            timestamp: now(),
        };
        Ok(AppleRecord::new(id, harvest))
    }

    async fn handle_action(
        &mut self,
        action: AppleAction,
        _ctx: &(),
    ) -> Result<AppleActionResult, AppleError> {
        if self.is_sold() {
            return Err(AppleError::AlreadySold(self.id));
        }

        match action {
            AppleAction::LogTransport(log) => {
                if self.transport.is_some() {
                    return Err(AppleError::TransportAlreadyLogged(self.id));
                }
                if log.end_timestamp < log.start_timestamp {
                    return Err(AppleError::InvalidTransport {
                        start: log.start_timestamp,
                        end: log.end_timestamp,
                    });
                }
                self.transport = Some(log);
                Ok(AppleActionResult::LogTransport(()))
            }
            AppleAction::LogStorageReading {
                reading,
                price,
                freshness,
            } => {
                if self.transport.is_none() {
                    return Err(AppleError::TransportMissing(self.id));
                }
                if price == 0 {
                    return Err(AppleError::InvalidPrice);
                }
                self.warehouse_logs.push(WarehouseLog {
                    temperature: reading.temperature,
                    ethylene_level: reading.ethylene,
                    freshness_score: freshness,
                    location: reading.location,
                    timestamp: reading.timestamp,
                });
                self.prices.push(price);
                self.freshness_history.push(freshness.value());
                Ok(AppleActionResult::LogStorageReading(self.warehouse_logs.len()))
            }
            AppleAction::LogStore(listing) => {
                self.store.ethylene_level = listing.ethylene_level;
                self.store.freshness_score = listing.freshness_score;
                self.store.timestamp = listing.timestamp;
                Ok(AppleActionResult::LogStore(()))
            }
            AppleAction::Sell(sale) => {
                if sale.price == 0 {
                    return Err(AppleError::InvalidPrice);
                }
                let sold_at = now();
                if !self.store.is_listed() {
                    self.store.timestamp = sold_at;
                }
                self.store.sold = true;
                self.store.buyer = Some(sale.buyer);
                self.store.sold_at = Some(sold_at);
                self.prices.push(sale.price);
                Ok(AppleActionResult::Sell(()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FreshnessScore, Sale, StorageReading, StoreListing, TransportLog};

    fn harvested() -> AppleRecord {
        AppleRecord::from_create_params(
            AppleId(0),
            CreateApple {
                soil_composition: "Loamy".into(),
                humidity: vec![55],
                chemicals: vec![120],
            },
        )
        .unwrap()
    }

    fn transport() -> TransportLog {
        TransportLog {
            start_timestamp: 100,
            end_timestamp: 200,
            gps_coordinates: vec!["28.6,77.2".into()],
            temperatures: vec![6],
            ethylene_levels: vec![0],
        }
    }

    fn reading(id: u32) -> AppleAction {
        AppleAction::LogStorageReading {
            reading: StorageReading {
                id,
                temperature: 20,
                ethylene: 3 + id,
                timestamp: 1_000 + i64::from(id),
                location: "Main Warehouse".into(),
                state: "WAREHOUSE".into(),
                spoilage_risk: false,
            },
            price: 100,
            freshness: FreshnessScore::try_from(90).unwrap(),
        }
    }

    #[test]
    fn harvest_requires_soil_and_series() {
        let err = AppleRecord::from_create_params(
            AppleId(1),
            CreateApple {
                soil_composition: " ".into(),
                humidity: vec![40],
                chemicals: vec![10],
            },
        );
        assert!(matches!(err, Err(AppleError::InvalidHarvest(_))));
    }

    #[tokio::test]
    async fn storage_requires_transport() {
        let mut apple = harvested();
        assert_eq!(
            apple.handle_action(reading(0), &()).await,
            Err(AppleError::TransportMissing(AppleId(0)))
        );

        apple
            .handle_action(AppleAction::LogTransport(transport()), &())
            .await
            .unwrap();
        assert_eq!(
            apple.handle_action(reading(0), &()).await,
            Ok(AppleActionResult::LogStorageReading(1))
        );
        assert_eq!(apple.prices, vec![100]);
        assert_eq!(apple.freshness_history, vec![90]);
    }

    #[tokio::test]
    async fn transport_is_logged_once() {
        let mut apple = harvested();
        apple
            .handle_action(AppleAction::LogTransport(transport()), &())
            .await
            .unwrap();
        let second = apple
            .handle_action(AppleAction::LogTransport(transport()), &())
            .await;
        assert_eq!(second, Err(AppleError::TransportAlreadyLogged(AppleId(0))));
    }

    #[tokio::test]
    async fn nothing_is_accepted_after_sale() {
        let mut apple = harvested();
        apple
            .handle_action(AppleAction::LogTransport(transport()), &())
            .await
            .unwrap();
        apple
            .handle_action(
                AppleAction::Sell(Sale {
                    buyer: "quick-sale".into(),
                    price: 80,
                }),
                &(),
            )
            .await
            .unwrap();
        assert!(apple.is_sold());
        assert_eq!(apple.store.buyer.as_deref(), Some("quick-sale"));
        assert_eq!(apple.current_price(), Some(80));

        assert_eq!(
            apple.handle_action(reading(1), &()).await,
            Err(AppleError::AlreadySold(AppleId(0)))
        );
        let listing = AppleAction::LogStore(StoreListing {
            ethylene_level: 5,
            freshness_score: FreshnessScore::PERFECT,
            timestamp: 1,
        });
        assert!(apple.handle_action(listing, &()).await.is_err());
    }

    #[tokio::test]
    async fn zero_price_is_rejected() {
        let mut apple = harvested();
        let sale = AppleAction::Sell(Sale {
            buyer: "anyone".into(),
            price: 0,
        });
        assert_eq!(apple.handle_action(sale, &()).await, Err(AppleError::InvalidPrice));
        assert!(!apple.is_sold());
    }
}
