//! Shared test utilities for FeedbackFlow integration harnesses.
//!
//! Import everything you need via `mod common; use common::*;` at the top of
//! each harness file. Every helper works against an isolated temporary
//! store directory; nothing touches the real `~/.feedbackflow`.

pub mod assertions;
pub mod builders;
pub mod fixtures;
pub mod pipe;

pub use assertions::*;
pub use builders::*;
pub use fixtures::*;
pub use pipe::*;
