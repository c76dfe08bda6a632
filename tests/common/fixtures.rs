//! Static payload corpora used across harnesses.

/// Metadata file contents that must all read back as an empty document.
pub const CORRUPT_META: &[&[u8]] = &[
    b"",
    b"{",
    b"not json at all",
    b"{\"entries\": [ {\"timestamp\": 3 } ]}",
    b"[1, 2, 3]",
    b"\xff\xfe\x00garbage",
];

/// Requests the extension sends, in the order a typical session sends them.
pub const EXTENSION_SESSION: &[&str] = &[
    r#"{"action":"clearFeedback","path":".feedbackflow/feedback.log"}"#,
    r#"{"action":"writeFeedback","path":".feedbackflow/feedback.log","content":"\n-------------------------------\nTimestamp: 2025-03-01T10:00:00.000Z\nURL: https://shop.test/cart\nTitle: Cart\nFeedback: The checkout button overlaps the footer\n-------------------------------\n"}"#,
    r#"{"action":"writeFeedback","path":".feedbackflow/feedback.log","content":"\n-------------------------------\nTimestamp: 2025-03-01T10:00:05.000Z\nURL: https://shop.test/\nTitle: Home\nFeedback: Hero image is blurry\n-------------------------------\n"}"#,
];

/// Payloads that must be answered with a failure response, paired with a
/// fragment of the expected error.
pub const BAD_REQUESTS: &[(&str, &str)] = &[
    ("{", "malformed request"),
    (r#"{"path":"x"}"#, "no action"),
    (r#"{"action":"launchRockets"}"#, "Unknown action"),
    (r#"{"action":"add"}"#, "malformed request"),
    (r#"{"action":"query","kind":"everything"}"#, "malformed request"),
    (r#"{"action":"markAddressed"}"#, "timestamp or an id"),
];
