//! Request / response vocabulary carried inside frames.
//!
//! Requests are JSON objects tagged by `action`. Decoding happens in two
//! steps so that malformed JSON, a missing tag and an unknown tag are each
//! reported distinctly instead of collapsing into one serde error.

use ff_core::StoreError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Where the extension writes when it does not name a path.
pub const DEFAULT_LOG_PATH: &str = ".feedbackflow/feedback.log";

const KNOWN_ACTIONS: &[&str] = &[
    "writeFeedback",
    "clearFeedback",
    "add",
    "markAddressed",
    "query",
];

fn default_log_path() -> String {
    DEFAULT_LOG_PATH.to_string()
}

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// Inbound message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Request {
    /// Append `content` verbatim to a file relative to the host base dir.
    WriteFeedback {
        #[serde(default = "default_log_path")]
        path: String,
        #[serde(default)]
        content: String,
    },
    /// Truncate a file relative to the host base dir and stamp a header.
    ClearFeedback {
        #[serde(default = "default_log_path")]
        path: String,
    },
    /// Append a structured event to the store.
    Add {
        message: String,
        #[serde(default)]
        source: Option<String>,
        #[serde(default)]
        context: Option<Map<String, Value>>,
    },
    /// Flag an entry, addressed by display timestamp or by id.
    MarkAddressed {
        #[serde(default)]
        timestamp: Option<String>,
        #[serde(default)]
        id: Option<u64>,
        #[serde(default)]
        resolution: Option<String>,
    },
    /// Read one of the store projections.
    Query { kind: QueryKind },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryKind {
    Log,
    Status,
    Meta,
}

impl Request {
    /// Decode a frame payload.
    pub fn decode(payload: &[u8]) -> Result<Request, RequestError> {
        let value: Value =
            serde_json::from_slice(payload).map_err(|e| RequestError::Decode(e.to_string()))?;

        let action = match value.get("action") {
            Some(Value::String(action)) => action.as_str(),
            Some(_) | None => return Err(RequestError::MissingAction),
        };
        if !KNOWN_ACTIONS.contains(&action) {
            return Err(RequestError::UnknownAction(action.to_string()));
        }

        serde_json::from_value(value).map_err(|e| RequestError::Decode(e.to_string()))
    }

    /// The `action` tag, for logging.
    pub fn action(&self) -> &'static str {
        match self {
            Request::WriteFeedback { .. } => "writeFeedback",
            Request::ClearFeedback { .. } => "clearFeedback",
            Request::Add { .. } => "add",
            Request::MarkAddressed { .. } => "markAddressed",
            Request::Query { .. } => "query",
        }
    }
}

/// Per-request failures. All of them are reported back in a response frame;
/// none of them ends the session.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("malformed request: {0}")]
    Decode(String),

    #[error("request has no action")]
    MissingAction,

    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("invalid request: {0}")]
    Invalid(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

// ---------------------------------------------------------------------------
// Response
// ---------------------------------------------------------------------------

/// Outbound message: `{"success": bool, "error"?: string, ...fields}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Response {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
            fields: Map::new(),
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            fields: Map::new(),
        }
    }

    /// Attach an action-specific field.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        serde_json::to_vec(self).unwrap_or_else(|e| {
            let fallback = Response::failure(format!("failed to encode response: {e}"));
            // A response with only a bool and a string always encodes.
            serde_json::to_vec(&fallback).unwrap_or_default()
        })
    }
}

impl From<&RequestError> for Response {
    fn from(err: &RequestError) -> Self {
        Response::failure(err.to_string())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
