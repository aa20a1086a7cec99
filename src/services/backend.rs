//! HTTP client for the supply-chain backend.
//!
//! The backend wraps every answer in `{ success, error?, ... }`. A non-2xx status or
//! `success: false` both become errors here, so callers only see the payload.

use super::{ServiceError, SupplyChainService};
use crate::model::{
    AppleId, AppleRecord, CreateApple, Sale, StorageSubmission, StoreListing, TransportLog,
};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument, warn};

pub const DEFAULT_BASE_URL: &str = "http://localhost:3001";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiResponse {
    success: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    apple_id: Option<u64>,
    #[serde(default)]
    apple: Option<AppleRecord>,
}

impl ApiResponse {
    fn into_result(self) -> Result<Self, ServiceError> {
        if self.success {
            Ok(self)
        } else {
            Err(ServiceError::Rejected(
                self.error.unwrap_or_else(|| "unknown error".into()),
            ))
        }
    }
}

#[derive(Debug, Deserialize)]
struct LatestId {
    id: u64,
}

/// One entry of the public product listing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShelfItem {
    pub apple_id: AppleId,
    #[serde(default)]
    pub temperature: u32,
    #[serde(default)]
    pub ethylene_level: u32,
    #[serde(default)]
    pub price: u64,
    #[serde(default)]
    pub freshness_score: u8,
}

/// Request body keyed by apple id.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ForApple<'a, B: Serialize> {
    apple_id: AppleId,
    #[serde(flatten)]
    body: &'a B,
}

/// Contract records carry an all-zero transport until one is logged.
fn normalize(mut record: AppleRecord) -> AppleRecord {
    if record
        .transport
        .as_ref()
        .is_some_and(|t| t.start_timestamp == 0)
    {
        record.transport = None;
    }
    record
}

/// [`SupplyChainService`] talking to the backend over HTTP.
#[derive(Clone)]
pub struct BackendClient {
    http: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ServiceError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<R: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        path: &str,
    ) -> Result<R, ServiceError> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!(path, status = status.as_u16(), "Backend error");
            return Err(ServiceError::Status {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.json::<R>().await?)
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<ApiResponse, ServiceError> {
        debug!(path, "POST");
        let response: ApiResponse = self
            .send(self.http.post(self.url(path)).json(body), path)
            .await?;
        response.into_result()
    }

    async fn post_for<B: Serialize>(
        &self,
        path: &str,
        apple_id: AppleId,
        body: &B,
    ) -> Result<(), ServiceError> {
        self.post(path, &ForApple { apple_id, body }).await?;
        Ok(())
    }

    /// Id of the most recently created apple.
    #[instrument(skip(self))]
    pub async fn latest_apple_id(&self) -> Result<AppleId, ServiceError> {
        let path = "/api/admin/latest-apple-id";
        let latest: LatestId = self.send(self.http.get(self.url(path)), path).await?;
        Ok(AppleId(latest.id))
    }

    /// Apples currently offered for sale, as flat summaries.
    #[instrument(skip(self))]
    pub async fn shelf(&self) -> Result<Vec<ShelfItem>, ServiceError> {
        let path = "/api/apples";
        self.send(self.http.get(self.url(path)), path).await
    }
}

#[async_trait]
impl SupplyChainService for BackendClient {
    #[instrument(skip(self, harvest))]
    async fn create_apple(&self, harvest: CreateApple) -> Result<AppleId, ServiceError> {
        let response = self.post("/api/admin/harvest", &harvest).await?;
        match response.apple_id {
            Some(id) => Ok(AppleId(id)),
            None => {
                debug!("No id in harvest response, asking for the latest id");
                self.latest_apple_id()
                    .await
                    .map_err(|_| ServiceError::MissingAppleId)
            }
        }
    }

    #[instrument(skip(self, log), fields(apple_id = %id))]
    async fn log_transport(&self, id: AppleId, log: TransportLog) -> Result<(), ServiceError> {
        self.post_for("/api/admin/transport", id, &log).await
    }

    #[instrument(skip(self, submission), fields(apple_id = %id, reading = submission.reading.id))]
    async fn process_storage_reading(
        &self,
        id: AppleId,
        submission: StorageSubmission,
    ) -> Result<(), ServiceError> {
        self.post_for("/api/admin/storage-reading", id, &submission)
            .await
    }

    #[instrument(skip(self, listing), fields(apple_id = %id))]
    async fn log_store(&self, id: AppleId, listing: StoreListing) -> Result<(), ServiceError> {
        self.post_for("/api/admin/store", id, &listing).await
    }

    #[instrument(skip(self, sale), fields(apple_id = %id))]
    async fn sell_apple(&self, id: AppleId, sale: Sale) -> Result<(), ServiceError> {
        self.post_for("/api/admin/sell", id, &sale).await
    }

    #[instrument(skip(self), fields(apple_id = %id))]
    async fn get_apple(&self, id: AppleId) -> Result<Option<AppleRecord>, ServiceError> {
        let path = format!("/api/admin/apple/{}", id.value());
        let response = self.http.get(self.url(&path)).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(ServiceError::Status {
                path,
                status: response.status().as_u16(),
            });
        }
        let body: ApiResponse = response.json().await?;
        Ok(body.into_result()?.apple.map(normalize))
    }

    /// Walks `0..=latest` and reads each record, the way the dashboard does. Missing and
    /// unreadable ids are skipped.
    #[instrument(skip(self))]
    async fn list_apples(&self) -> Result<Vec<AppleRecord>, ServiceError> {
        let latest = match self.latest_apple_id().await {
            Ok(id) => id,
            Err(ServiceError::Status { status: 404, .. }) => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let mut records = Vec::new();
        for raw in 0..=latest.value() {
            match self.get_apple(AppleId(raw)).await {
                Ok(Some(record)) => records.push(record),
                Ok(None) => debug!(apple_id = raw, "No record"),
                Err(e) => warn!(apple_id = raw, error = %e, "Skipping unreadable record"),
            }
        }
        Ok(records)
    }
}
