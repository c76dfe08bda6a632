//! Domain-specific assertion macros for FeedbackFlow harnesses.
//!
//! These add context-rich failure messages that make it clear *which*
//! response or store invariant was violated.

use ff_core::{MetaDocument, MetaEntry};

// ---------------------------------------------------------------------------
// Response assertions
// ---------------------------------------------------------------------------

/// Assert that a host [`Response`](ff_host::Response) reports success.
#[macro_export]
macro_rules! assert_success {
    ($resp:expr) => {{
        let resp: &ff_host::Response = &$resp;
        if !resp.success {
            panic!(
                "assert_success! failed: response reported failure\n  error:  {:?}\n  fields: {:?}",
                resp.error, resp.fields
            );
        }
    }};
}

/// Assert that a response failed and its error mentions `needle`.
#[macro_export]
macro_rules! assert_failure {
    ($resp:expr, $needle:expr) => {{
        let resp: &ff_host::Response = &$resp;
        let needle: &str = $needle;
        match (&resp.success, &resp.error) {
            (false, Some(err)) if err.contains(needle) => {}
            (false, Some(err)) => panic!(
                "assert_failure! failed: error does not mention {:?}\n  error: {:?}",
                needle, err
            ),
            _ => panic!(
                "assert_failure! failed: expected a failure response\n  got: {:?}",
                resp
            ),
        }
    }};
}

// ---------------------------------------------------------------------------
// Store assertions
// ---------------------------------------------------------------------------

/// Assert that the log text contains the block for `timestamp` / `message`.
#[macro_export]
macro_rules! assert_log_block {
    ($log:expr, $timestamp:expr, $message:expr) => {{
        let log: &str = &$log;
        let block = format!("[{}] {}", $timestamp, $message);
        if !log.contains(&block) {
            panic!(
                "assert_log_block! failed: {:?} not found in log\n  log: {:?}",
                block, log
            );
        }
    }};
}

/// The single entry of a one-entry document.
pub fn only_entry(doc: &MetaDocument) -> &MetaEntry {
    assert_eq!(
        doc.entries.len(),
        1,
        "expected exactly one metadata entry, found {:?}",
        doc.entries
    );
    &doc.entries[0]
}

/// Assert every id in the document is unique and increasing.
pub fn assert_ids_increasing(doc: &MetaDocument) {
    for pair in doc.entries.windows(2) {
        assert!(
            pair[0].id < pair[1].id,
            "ids not increasing: {} then {}",
            pair[0].id,
            pair[1].id
        );
    }
}
