//! Client for the hosted document store.
//!
//! All records live in one fixed collection. The store owns record identity:
//! `put` returns the id the store assigned, and there is deliberately no
//! point lookup or point delete — GET/DELETE callers operate against the
//! full collection view and filter in-process.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use crate::config::StoreConfig;
use crate::models::SentenceRecord;

/// Environment variable holding the optional store bearer token.
pub const STORE_TOKEN_ENV: &str = "SENTIQ_STORE_TOKEN";

/// Document store errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Store error ({code}): {message}")]
    Api { code: u16, message: String },
}

// ============================================================================
// Wire structs
// ============================================================================

#[derive(Debug, Deserialize)]
struct PutResponse {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct FetchAllResponse {
    #[serde(default)]
    documents: Vec<DocumentEnvelope>,
}

#[derive(Debug, Deserialize)]
struct DocumentEnvelope {
    id: i64,
    document: SentenceRecord,
}

#[derive(Debug, Deserialize)]
struct DeleteAllResponse {
    deleted: u64,
}

/// Collection-level stats, used by the health endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct CollectionStats {
    pub name: String,
    pub count: u64,
}

#[derive(Debug, Deserialize)]
struct StoreErrorResponse {
    error: Option<StoreErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct StoreErrorDetail {
    code: u16,
    message: String,
}

// ============================================================================
// RecordStore
// ============================================================================

/// Reusable client for the document store, constructed once per process.
#[derive(Debug, Clone)]
pub struct RecordStore {
    client: Client,
    base_url: String,
    collection: String,
    token: Option<String>,
}

impl RecordStore {
    /// Create a store client against the configured endpoint, reading the
    /// optional bearer token from the environment.
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        let token = std::env::var(STORE_TOKEN_ENV).ok();
        Self::with_base_url(config, token, config.endpoint.clone())
    }

    /// Create a store client with a custom base URL (for testing /
    /// integration).
    pub fn with_base_url(
        config: &StoreConfig,
        token: Option<String>,
        base_url: String,
    ) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url,
            collection: config.collection.clone(),
            token,
        })
    }

    /// Persist one record; the store assigns and returns a fresh id.
    pub async fn put(&self, record: &SentenceRecord) -> Result<i64, StoreError> {
        let request = self
            .client
            .post(self.documents_url())
            .json(record);

        let response: PutResponse = self.send(request).await?;
        Ok(response.id)
    }

    /// Full scan of the collection. No pagination, no server-side filtering.
    pub async fn fetch_all(&self) -> Result<Vec<(i64, SentenceRecord)>, StoreError> {
        let request = self.client.get(self.documents_url());

        let response: FetchAllResponse = self.send(request).await?;
        Ok(response
            .documents
            .into_iter()
            .map(|envelope| (envelope.id, envelope.document))
            .collect())
    }

    /// Remove every record in the collection. Returns the deleted count.
    pub async fn delete_all(&self) -> Result<u64, StoreError> {
        let request = self.client.delete(self.documents_url());

        let response: DeleteAllResponse = self.send(request).await?;
        Ok(response.deleted)
    }

    /// Collection stats, used as a reachability probe by the health check.
    pub async fn stats(&self) -> Result<CollectionStats, StoreError> {
        let url = format!("{}/v1/collections/{}", self.base_url, self.collection);
        let request = self.client.get(&url);
        self.send(request).await
    }

    fn documents_url(&self) -> String {
        format!(
            "{}/v1/collections/{}/documents",
            self.base_url, self.collection
        )
    }

    async fn send<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, StoreError> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            let error_detail = serde_json::from_str::<StoreErrorResponse>(&error_body)
                .ok()
                .and_then(|e| e.error);

            let (code, message) = error_detail
                .map(|e| (e.code, e.message))
                .unwrap_or((status.as_u16(), error_body));

            tracing::error!(code = code, message = %message, collection = %self.collection, "Store error");

            return Err(StoreError::Api { code, message });
        }

        Ok(response.json().await?)
    }
}

// ============================================================================
// TESTS
// ============================================================================
