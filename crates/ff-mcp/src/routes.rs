//! Route handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use ff_core::{EntryKey, MarkOutcome, MetaDocument, Store, StoreStatus};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::error::ApiError;
use crate::prompts;

/// Run blocking store work off the async workers.
async fn blocking<T, F>(store: Store, f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&Store) -> Result<T, ff_core::StoreError> + Send + 'static,
{
    Ok(tokio::task::spawn_blocking(move || f(&store)).await??)
}

// ---------------------------------------------------------------------------
// Index
// ---------------------------------------------------------------------------

pub async fn index() -> Json<Value> {
    let prompts: Vec<Value> = prompts::ALL
        .iter()
        .map(|(name, description, _)| json!({ "name": name, "description": description }))
        .collect();

    Json(json!({
        "name": "FeedbackFlow",
        "description": "Website feedback collected by the FeedbackFlow browser extension",
        "resources": [
            { "uri": "feedback://log", "path": "/resources/log", "description": "Full feedback log text" },
            { "uri": "feedback://status", "path": "/resources/status", "description": "Log file existence, size and modification time" },
            { "uri": "feedback://meta", "path": "/resources/meta", "description": "Structured entries with source, context and resolution" },
        ],
        "tools": [
            { "name": "add_feedback", "params": ["message", "source?", "context?"] },
            { "name": "clear_feedback", "params": [] },
            { "name": "mark_feedback_addressed", "params": ["timestamp | id", "resolution?"] },
        ],
        "prompts": prompts,
    }))
}

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

pub async fn log(State(store): State<Store>) -> Result<String, ApiError> {
    blocking(store, |s| s.read_log()).await
}

pub async fn status(State(store): State<Store>) -> Result<Json<StoreStatus>, ApiError> {
    blocking(store, |s| s.status()).await.map(Json)
}

pub async fn meta(State(store): State<Store>) -> Result<Json<MetaDocument>, ApiError> {
    blocking(store, |s| s.read_meta()).await.map(Json)
}

// ---------------------------------------------------------------------------
// Tools
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct AddFeedback {
    pub message: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub context: Option<Map<String, Value>>,
}

pub async fn add_feedback(
    State(store): State<Store>,
    Json(req): Json<AddFeedback>,
) -> Result<Json<Value>, ApiError> {
    let entry = blocking(store, move |s| s.append(&req.message, req.source, req.context)).await?;
    Ok(Json(json!({
        "success": true,
        "message": format!("Feedback added successfully at {}", entry.timestamp),
        "timestamp": entry.timestamp,
        "id": entry.id,
    })))
}

pub async fn clear_feedback(State(store): State<Store>) -> Result<Json<Value>, ApiError> {
    let ts = blocking(store, |s| s.clear()).await?;
    Ok(Json(json!({
        "success": true,
        "message": format!("Feedback log cleared successfully at {ts}"),
        "timestamp": ts,
    })))
}

#[derive(Debug, Deserialize)]
pub struct MarkFeedback {
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub resolution: Option<String>,
}

pub async fn mark_feedback_addressed(
    State(store): State<Store>,
    Json(req): Json<MarkFeedback>,
) -> Result<impl IntoResponse, ApiError> {
    let key = match (req.id, req.timestamp) {
        (Some(id), _) => EntryKey::Id(id),
        (None, Some(ts)) => EntryKey::Timestamp(ts),
        (None, None) => {
            return Err(ApiError::BadRequest(
                "mark_feedback_addressed needs a timestamp or an id".to_string(),
            ))
        }
    };

    let lookup = key.clone();
    let outcome = blocking(store, move |s| s.mark_addressed(&lookup, req.resolution)).await?;
    Ok(match outcome {
        MarkOutcome::Found => (
            StatusCode::OK,
            Json(json!({ "success": true, "message": "Feedback entry marked as addressed" })),
        ),
        MarkOutcome::NotFound => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "success": false,
                "error": format!("No feedback entry found with {key}"),
            })),
        ),
    })
}

// ---------------------------------------------------------------------------
// Prompts
// ---------------------------------------------------------------------------

pub async fn prompt(Path(name): Path<String>) -> Result<&'static str, (StatusCode, String)> {
    prompts::get(&name).ok_or_else(|| (StatusCode::NOT_FOUND, format!("no prompt named {name}")))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
