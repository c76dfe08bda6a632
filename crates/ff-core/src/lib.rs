//! ff-core: FeedbackFlow core library.
//!
//! This crate owns the on-disk event store and everything that reads it
//! directly, plus the shared types used by the host and assistant surfaces.
//!
//! # Architecture
//!
//! ```text
//! caller ──► ff-host (frames) ──► Store ──► feedback.log
//!                                   │  └──► feedback_meta.json
//! ff-mcp (resources/tools) ─────────┘
//!
//! Tailer ──► feedback.log (read-only, polling)
//! ```
//!
//! No lock is shared between processes: the store is a pair of whole-file
//! read-modify-write targets and readers never coordinate with writers.

pub mod config;
pub mod error;
pub mod store;
pub mod tail;
pub mod types;

pub use error::StoreError;
pub use store::{timestamp, Store, LOG_MISSING_SENTINEL};
pub use tail::{TailEvent, Tailer};
pub use types::{EntryKey, MarkOutcome, MetaDocument, MetaEntry, StoreStatus};
