//! Client for the hosted natural-language analysis API.
//!
//! Two operations are used:
//! - `documents:analyzeSentiment` — per-sentence sentiment scores for a text
//! - `documents:analyzeEntities` — named entities for a text fragment
//!
//! `analyze()` issues one sentiment call for the whole input, then one entity
//! call per detected sentence using only that sentence's fragment, so entities
//! are scoped to the sentence rather than the document. Failures propagate
//! unmodified; there are no retries.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::LanguageConfig;
use crate::models::{EntityRecord, MentionRecord, SentenceAnalysis};

/// Environment variable holding the language API key.
pub const API_KEY_ENV: &str = "GOOGLE_API_KEY";

/// Language API errors
#[derive(Error, Debug)]
pub enum LanguageError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("Missing API key (set GOOGLE_API_KEY)")]
    MissingApiKey,
}

// ============================================================================
// Wire structs (private)
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AnnotateRequest {
    document: Document,
    encoding_type: String,
}

impl AnnotateRequest {
    fn plain_text(content: &str) -> Self {
        Self {
            document: Document {
                doc_type: "PLAIN_TEXT".to_string(),
                content: content.to_string(),
            },
            encoding_type: "UTF8".to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct Document {
    #[serde(rename = "type")]
    doc_type: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct AnalyzeSentimentResponse {
    #[serde(default)]
    sentences: Vec<ApiSentence>,
}

#[derive(Debug, Deserialize)]
struct ApiSentence {
    text: ApiTextSpan,
    sentiment: ApiSentiment,
}

#[derive(Debug, Deserialize)]
struct ApiTextSpan {
    content: String,
}

#[derive(Debug, Deserialize, Default)]
struct ApiSentiment {
    #[serde(default)]
    score: f32,
    #[serde(default)]
    magnitude: f32,
}

#[derive(Debug, Deserialize)]
struct AnalyzeEntitiesResponse {
    #[serde(default)]
    entities: Vec<ApiEntity>,
}

#[derive(Debug, Deserialize)]
struct ApiEntity {
    name: String,
    #[serde(rename = "type")]
    entity_type: String,
    #[serde(default)]
    salience: f32,
    #[serde(default)]
    metadata: BTreeMap<String, String>,
    #[serde(default)]
    mentions: Vec<ApiMention>,
}

#[derive(Debug, Deserialize)]
struct ApiMention {
    text: ApiTextSpan,
    #[serde(rename = "type")]
    mention_type: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    code: u16,
    message: String,
}

// ============================================================================
// LanguageClient
// ============================================================================

/// Reusable client for the language API. Constructed once per process and
/// shared; each call is one or more blocking round trips with no retry.
#[derive(Debug, Clone)]
pub struct LanguageClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl LanguageClient {
    /// Create a client against the configured endpoint, reading the API key
    /// from the environment.
    pub fn new(config: &LanguageConfig) -> Result<Self, LanguageError> {
        let api_key = std::env::var(API_KEY_ENV).unwrap_or_default();
        Self::with_base_url(config, api_key, config.endpoint.clone())
    }

    /// Create a client with an explicit key and base URL (for testing /
    /// integration).
    pub fn with_base_url(
        config: &LanguageConfig,
        api_key: String,
        base_url: String,
    ) -> Result<Self, LanguageError> {
        if api_key.is_empty() {
            return Err(LanguageError::MissingApiKey);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            api_key,
            base_url,
        })
    }

    /// Analyze sentiment per sentence, then extract entities for each
    /// sentence fragment.
    pub async fn analyze(&self, text: &str) -> Result<Vec<SentenceAnalysis>, LanguageError> {
        let response: AnalyzeSentimentResponse = self.call("analyzeSentiment", text).await?;

        let mut analyses = Vec::with_capacity(response.sentences.len());
        for sentence in response.sentences {
            let fragment = sentence.text.content;
            // Entity extraction sees only this sentence's fragment.
            let entities = self.analyze_entities(&fragment).await?;
            analyses.push(SentenceAnalysis {
                text: fragment,
                score: sentence.sentiment.score,
                magnitude: sentence.sentiment.magnitude,
                entities,
            });
        }

        Ok(analyses)
    }

    /// Extract named entities from a text fragment. All mentions of an entity
    /// are kept, in the order the API returns them.
    pub async fn analyze_entities(&self, text: &str) -> Result<Vec<EntityRecord>, LanguageError> {
        let response: AnalyzeEntitiesResponse = self.call("analyzeEntities", text).await?;

        Ok(response
            .entities
            .into_iter()
            .map(|entity| EntityRecord {
                name: entity.name,
                entity_type: entity.entity_type,
                salience: entity.salience,
                metadata: entity.metadata,
                mentions: entity
                    .mentions
                    .into_iter()
                    .map(|mention| MentionRecord {
                        text: mention.text.content,
                        mention_type: mention.mention_type,
                    })
                    .collect(),
            })
            .collect())
    }

    async fn call<T: serde::de::DeserializeOwned>(
        &self,
        operation: &str,
        text: &str,
    ) -> Result<T, LanguageError> {
        let url = format!(
            "{}/v1/documents:{}?key={}",
            self.base_url, operation, self.api_key
        );

        let request = AnnotateRequest::plain_text(text);
        let response = self.client.post(&url).json(&request).send().await?;

        let status = response.status();

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            let error_detail = serde_json::from_str::<ApiErrorResponse>(&error_body)
                .ok()
                .and_then(|e| e.error);

            let (code, message) = error_detail
                .map(|e| (e.code, e.message))
                .unwrap_or((status.as_u16(), error_body));

            tracing::error!(code = code, message = %message, operation, "Language API error");

            return Err(LanguageError::Api { code, message });
        }

        Ok(response.json().await?)
    }
}

// ============================================================================
// TESTS
// ============================================================================
