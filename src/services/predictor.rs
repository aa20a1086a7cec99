//! Price and freshness prediction for warehouse readings.

use super::ServiceError;
use crate::model::Valuation;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/api/v1";
pub const PRODUCT_NAME: &str = "Apple";

/// Predicts the price and freshness for a reading.
#[async_trait]
pub trait PricePredictor: Send + Sync {
    async fn predict(
        &self,
        temperature: u32,
        ethylene: u32,
        base_price: u64,
    ) -> Result<Valuation, ServiceError>;
}

#[derive(Debug, Serialize)]
struct PredictRequest<'a> {
    product_name: &'a str,
    temp: u32,
    ethylene: u32,
    base_price: u64,
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    predicted_price: f64,
    freshness_score: f64,
}

/// Client for the prediction API.
#[derive(Clone)]
pub struct PredictorClient {
    http: Client,
    base_url: String,
}

impl PredictorClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl PricePredictor for PredictorClient {
    #[instrument(skip(self))]
    async fn predict(
        &self,
        temperature: u32,
        ethylene: u32,
        base_price: u64,
    ) -> Result<Valuation, ServiceError> {
        let request = PredictRequest {
            product_name: PRODUCT_NAME,
            temp: temperature,
            ethylene,
            base_price,
        };
        let response = self
            .http
            .post(format!("{}/predict", self.base_url))
            .json(&request)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ServiceError::Prediction(format!(
                "status {}",
                response.status().as_u16()
            )));
        }
        let body: PredictResponse = response.json().await?;
        debug!(?body, "Prediction");

        if !body.predicted_price.is_finite() || body.predicted_price < 0.0 {
            return Err(ServiceError::Prediction(format!(
                "invalid price {}",
                body.predicted_price
            )));
        }
        // Freshness is passed through unchecked; the reading gate validates it.
        Ok(Valuation::new(
            body.predicted_price.round() as u64,
            body.freshness_score.round() as i64,
        ))
    }
}

/// Offline predictor returning a constant valuation.
///
/// Without a fixed price the base price is carried forward unchanged.
#[derive(Debug, Clone)]
pub struct FixedPredictor {
    price: Option<u64>,
    freshness: i64,
}

impl FixedPredictor {
    pub fn new(price: Option<u64>, freshness: i64) -> Self {
        Self { price, freshness }
    }
}

#[async_trait]
impl PricePredictor for FixedPredictor {
    async fn predict(
        &self,
        _temperature: u32,
        _ethylene: u32,
        base_price: u64,
    ) -> Result<Valuation, ServiceError> {
        Ok(Valuation::new(
            self.price.unwrap_or(base_price),
            self.freshness,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    #[tokio::test]
    async fn predictor_posts_sensor_values() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/api/v1/predict").json_body(json!({
                    "product_name": "Apple",
                    "temp": 21,
                    "ethylene": 6,
                    "base_price": 100
                }));
                then.status(200)
                    .json_body(json!({ "predicted_price": 92.6, "freshness_score": 81.2 }));
            })
            .await;

        let predictor = PredictorClient::new(server.url("/api/v1"));
        let valuation = predictor.predict(21, 6, 100).await.unwrap();
        assert_eq!(valuation, Valuation::new(93, 81));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn predictor_failure_is_reported() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/predict");
                then.status(503);
            })
            .await;

        let predictor = PredictorClient::new(server.base_url());
        let err = predictor.predict(20, 4, 50).await.unwrap_err();
        assert!(matches!(err, ServiceError::Prediction(_)));
    }

    #[tokio::test]
    async fn fixed_predictor_carries_base_price() {
        let carry = FixedPredictor::new(None, 90);
        assert_eq!(carry.predict(20, 4, 120).await.unwrap(), Valuation::new(120, 90));
        let fixed = FixedPredictor::new(Some(75), 60);
        assert_eq!(fixed.predict(20, 4, 120).await.unwrap(), Valuation::new(75, 60));
    }
}
