//! Core types for ff-core.
//!
//! These are the records persisted in `feedback_meta.json` and the
//! projections handed back to callers. Field names on the wire match the
//! document the browser extension and assistant integrations already read.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Structured record mirroring one timestamped block in `feedback.log`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaEntry {
    /// Monotonic identifier within the current document. Entries written
    /// before identifiers existed read back as `0`.
    #[serde(default)]
    pub id: u64,
    /// Second-granularity local time, `YYYY-MM-DD HH:MM:SS`. Shared with the
    /// matching log block.
    pub timestamp: String,
    pub message: String,
    /// Where the feedback came from, usually a page URL.
    #[serde(default)]
    pub source: Option<String>,
    /// Free-form structured context supplied by the caller.
    #[serde(default)]
    pub context: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(default)]
    pub addressed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub addressed_at: Option<String>,
}

impl MetaEntry {
    pub fn new(id: u64, timestamp: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id,
            timestamp: timestamp.into(),
            message: message.into(),
            source: None,
            context: None,
            addressed: false,
            resolution: None,
            addressed_at: None,
        }
    }
}

/// The whole metadata file: `{"entries": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetaDocument {
    #[serde(default)]
    pub entries: Vec<MetaEntry>,
}

impl MetaDocument {
    /// Identifier the next appended entry receives.
    pub fn next_id(&self) -> u64 {
        self.entries.iter().map(|e| e.id).max().unwrap_or(0).saturating_add(1)
    }

    /// Every entry stamped with `timestamp`, in document order. More than one
    /// result means the timestamp alone is ambiguous.
    pub fn find_by_timestamp(&self, timestamp: &str) -> Vec<&MetaEntry> {
        self.entries
            .iter()
            .filter(|e| e.timestamp == timestamp)
            .collect()
    }

    /// Index of the first entry matching `key` in document order.
    pub fn position(&self, key: &EntryKey) -> Option<usize> {
        self.entries.iter().position(|e| match key {
            EntryKey::Timestamp(ts) => e.timestamp == *ts,
            EntryKey::Id(id) => e.id == *id,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// How a caller addresses an existing entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKey {
    /// Display timestamp. Matches the first entry in document order.
    Timestamp(String),
    /// Unambiguous identifier assigned at append time.
    Id(u64),
}

impl std::fmt::Display for EntryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryKey::Timestamp(ts) => write!(f, "timestamp {ts}"),
            EntryKey::Id(id) => write!(f, "id {id}"),
        }
    }
}

/// Result of [`Store::mark_addressed`](crate::Store::mark_addressed).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkOutcome {
    Found,
    NotFound,
}

/// Read-only stat projection of the log file. A missing file is a valid
/// status, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStatus {
    pub exists: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
    pub path: PathBuf,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
