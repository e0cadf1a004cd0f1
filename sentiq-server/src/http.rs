//! Sentiq HTTP REST API
//!
//! Axum-based HTTP surface over the language client and the record store.
//!
//! Architecture: each endpoint has a thin axum handler that delegates to a
//! directly testable inner function returning `(StatusCode, serde_json::Value)`.
//!
//! Endpoints:
//! - GET    /health    — health check with store reachability
//! - GET    /version   — server version info
//! - GET    /api/text  — fetch one stored record by `ID` query parameter
//! - DELETE /api/text  — wipe the entire collection (the `ID` parameter is ignored)
//! - POST   /api/text  — analyze form-field `text`, store one record per sentence

use std::sync::Arc;

use anyhow::Result;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Form, Json, Router};
use chrono::Utc;
use sentiq_core::models::{SentenceRecord, Sentiment};
use sentiq_core::{LanguageClient, RecordStore, SentiqConfig};
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

/// Body returned when the requested id is not in the collection. The
/// framework of the original service JSON-encoded bare strings, so this is
/// served as a JSON string, not an object.
pub const NOT_FOUND_MSG: &str = "Id was not found in the database";

/// Body returned by DELETE after wiping the collection.
pub const DELETE_OK_MSG: &str = "Delete All Successful";

/// Shared state for all HTTP handlers. Both clients are built once per
/// process and reused across requests.
pub struct AppState {
    pub language: LanguageClient,
    pub store: RecordStore,
}

/// Build the Axum router with all endpoints
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/version", get(version_handler))
        .route(
            "/api/text",
            get(get_text_handler)
                .delete(delete_text_handler)
                .post(post_text_handler),
        )
        .with_state(state)
}

/// Start the HTTP server on the configured address.
/// Gracefully shuts down when the broadcast shutdown signal fires.
pub async fn start_http_server(
    config: &SentiqConfig,
    state: Arc<AppState>,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<()> {
    let addr = format!("{}:{}", config.http.host, config.http.port);

    let app = build_router(state);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Sentiq HTTP API listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
            tracing::info!("HTTP server shutting down...");
        })
        .await?;

    Ok(())
}

// ============================================================================
// Request DTOs
// ============================================================================

/// `?ID=<i64>` query parameter, shared by GET and DELETE.
#[derive(Debug, Deserialize, Default)]
pub struct IdQuery {
    #[serde(rename = "ID")]
    pub id: Option<i64>,
}

/// Urlencoded form body of POST.
#[derive(Debug, Deserialize, Default)]
pub struct PostTextForm {
    pub text: Option<String>,
}

// ============================================================================
// Inner (directly testable) business logic functions
// ============================================================================

/// Inner GET — full scan of the collection, then a linear id match. An
/// absent id and an empty collection are indistinguishable by design.
pub async fn get_text_inner(store: &RecordStore, query: IdQuery) -> (StatusCode, serde_json::Value) {
    let records = match store.fetch_all().await {
        Ok(r) => r,
        Err(e) => return internal_error(e),
    };

    if let Some(wanted) = query.id {
        for (id, record) in records {
            if id == wanted {
                let mut result = serde_json::Map::new();
                result.insert(id.to_string(), record_to_json(&record));
                return (StatusCode::OK, serde_json::Value::Object(result));
            }
        }
    }

    (StatusCode::OK, serde_json::json!(NOT_FOUND_MSG))
}

/// Inner DELETE — unconditionally wipes the collection. The id parameter is
/// accepted for URL compatibility but never consulted.
pub async fn delete_text_inner(
    store: &RecordStore,
    _query: IdQuery,
) -> (StatusCode, serde_json::Value) {
    match store.delete_all().await {
        Ok(deleted) => {
            tracing::info!(deleted, "Collection wiped");
            (StatusCode::OK, serde_json::json!(DELETE_OK_MSG))
        }
        Err(e) => internal_error(e),
    }
}

/// Inner POST — analyze the text, then store one record per sentence.
/// Writes are not transactional: records persisted before a failure stay
/// persisted, and the request fails with 500.
pub async fn post_text_inner(
    language: &LanguageClient,
    store: &RecordStore,
    form: PostTextForm,
) -> (StatusCode, serde_json::Value) {
    let text = match form.text {
        Some(t) if !t.trim().is_empty() => t,
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                serde_json::json!({
                    "error": "text field is required",
                    "status": "error",
                }),
            );
        }
    };

    let analyses = match language.analyze(&text).await {
        Ok(a) => a,
        Err(e) => return internal_error(e),
    };

    let mut result = serde_json::Map::new();
    for analysis in analyses {
        let record = SentenceRecord {
            text: analysis.text,
            timestamp: Utc::now(),
            sentiment: Sentiment::from_score(analysis.score),
            entities: analysis.entities,
        };

        let id = match store.put(&record).await {
            Ok(id) => id,
            Err(e) => return internal_error(e),
        };

        tracing::debug!(id, sentiment = ?record.sentiment, "Stored sentence record");
        result.insert(id.to_string(), record_to_json(&record));
    }

    (StatusCode::OK, serde_json::Value::Object(result))
}

/// Inner health check — probes the store and returns (status_code, json_body).
pub async fn health_inner(store: &RecordStore) -> (StatusCode, serde_json::Value) {
    match store.stats().await {
        Ok(stats) => (
            StatusCode::OK,
            serde_json::json!({
                "status": "healthy",
                "version": env!("CARGO_PKG_VERSION"),
                "collection": stats.name,
                "records": stats.count,
            }),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            serde_json::json!({
                "status": "unhealthy",
                "error": e.to_string(),
            }),
        ),
    }
}

/// Inner version — returns version info (pure, no IO).
pub fn version_inner() -> serde_json::Value {
    serde_json::json!({
        "version": env!("CARGO_PKG_VERSION"),
        "service": "sentiq",
    })
}

// ============================================================================
// Axum handler wrappers (thin — delegate to inner functions)
// ============================================================================

pub async fn get_text_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<IdQuery>,
) -> impl IntoResponse {
    let (status, body) = get_text_inner(&state.store, query).await;
    (status, Json(body))
}

pub async fn delete_text_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<IdQuery>,
) -> impl IntoResponse {
    let (status, body) = delete_text_inner(&state.store, query).await;
    (status, Json(body))
}

pub async fn post_text_handler(
    State(state): State<Arc<AppState>>,
    Form(form): Form<PostTextForm>,
) -> impl IntoResponse {
    let (status, body) = post_text_inner(&state.language, &state.store, form).await;
    (status, Json(body))
}

pub async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let (status, body) = health_inner(&state.store).await;
    (status, Json(body))
}

pub async fn version_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(version_inner()))
}

// ============================================================================
// Helpers
// ============================================================================

/// Map any backend failure to a structured 500 body. Message text only —
/// never an HTML page, never a stack trace.
fn internal_error(e: impl std::fmt::Display) -> (StatusCode, serde_json::Value) {
    tracing::error!(error = %e, "Request failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        serde_json::json!({
            "error": e.to_string(),
            "status": "error",
        }),
    )
}

/// Serialization of a record cannot fail (string keys, RFC 3339 timestamps),
/// so a null fallback is enough to keep the handlers total.
fn record_to_json(record: &SentenceRecord) -> serde_json::Value {
    serde_json::to_value(record).unwrap_or(serde_json::Value::Null)
}

// ============================================================================
// Unit Tests — pure pieces only; IO paths are covered in tests/
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_inner_pure() {
        let v = version_inner();
        assert!(v["version"].is_string(), "version must be string");
        assert_eq!(v["service"], "sentiq");
    }

    #[test]
    fn test_record_to_json_shape() {
        let record = SentenceRecord {
            text: "Good news today.".to_string(),
            timestamp: Utc::now(),
            sentiment: Sentiment::Positive,
            entities: vec![],
        };

        let value = record_to_json(&record);
        assert_eq!(value["text"], "Good news today.");
        assert_eq!(value["sentiment"], "positive");
        assert!(value["timestamp"].is_string());
        assert!(value["entities"].is_array());
    }

    #[test]
    fn test_id_query_parses_uppercase_key() {
        let query: IdQuery = serde_urlencoded::from_str("ID=42").unwrap();
        assert_eq!(query.id, Some(42));

        let query: IdQuery = serde_urlencoded::from_str("").unwrap();
        assert_eq!(query.id, None);
    }
}
