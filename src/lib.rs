//! FeedbackFlow
//!
//! Native messaging host and event store for feedback captured by the
//! browser extension. This crate is the CLI shell; the pieces live in the
//! workspace members and are re-exported here so integration tests can
//! import them from one place.
//!
//! # Architecture
//!
//! ```text
//! browser ──frames──► ff-host ──► ff-core::Store ◄── ff-mcp (HTTP)
//!                                      │
//!                                      └──► ff-core::Tailer (read --watch)
//! ```

pub mod commands;
pub mod logging;

pub use ff_core as core;
pub use ff_host as host;
pub use ff_mcp as mcp;
