//! ff-host: native messaging host for FeedbackFlow.
//!
//! The browser launches this process and talks to it over a pair of
//! anonymous pipes (the child's stdin/stdout). Each message is a frame: a
//! 4-byte little-endian length followed by that many bytes of UTF-8 JSON.
//!
//! ```text
//! stdin ──► read_frame ──► Request::decode ──► Handler ──► Store
//!                                                 │
//! stdout ◄── write_frame ◄── Response ◄───────────┘
//! ```
//!
//! Requests are served strictly one at a time. Per-request failures become
//! `{"success": false, "error": ...}` responses; only a transport failure
//! ends the session.

pub mod frame;
pub mod handler;
pub mod protocol;
pub mod serve;

pub use frame::{encode_frame, read_frame, write_frame, FrameError, PREFIX_LEN};
pub use handler::Handler;
pub use protocol::{QueryKind, Request, RequestError, Response};
pub use serve::{serve, serve_stdio, HostLimits, ServeSummary};
