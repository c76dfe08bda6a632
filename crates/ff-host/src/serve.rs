//! Serve loop: one request at a time until end-of-stream.

use std::io::{self, Read, Write};

use ff_core::config::HostConfig;
use tracing::{debug, info, warn};

use crate::frame::{read_frame, write_frame, FrameError};
use crate::handler::Handler;
use crate::protocol::Response;

/// Size limits applied to the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostLimits {
    pub max_frame_bytes: u32,
    pub max_response_bytes: u32,
}

impl Default for HostLimits {
    fn default() -> Self {
        Self::from(&HostConfig::default())
    }
}

impl From<&HostConfig> for HostLimits {
    fn from(cfg: &HostConfig) -> Self {
        Self {
            max_frame_bytes: cfg.max_frame_bytes,
            max_response_bytes: cfg.max_response_bytes,
        }
    }
}

/// Counters reported when the peer closes the channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServeSummary {
    pub requests: u64,
    pub failures: u64,
}

/// Serve frames from `reader` to `writer` until the peer closes its end.
///
/// Returns `Ok` on clean end-of-stream. Per-request errors are answered and
/// counted; a [`FrameError`] ends the session and is returned.
pub fn serve<R: Read, W: Write>(
    mut reader: R,
    mut writer: W,
    handler: &Handler,
    limits: HostLimits,
) -> Result<ServeSummary, FrameError> {
    let mut summary = ServeSummary::default();

    while let Some(payload) = read_frame(&mut reader, limits.max_frame_bytes)? {
        summary.requests += 1;

        let mut response = handler.handle_frame(&payload);
        let mut bytes = response.to_bytes();
        if bytes.len() > limits.max_response_bytes as usize {
            warn!(len = bytes.len(), max = limits.max_response_bytes, "response too large");
            response = Response::failure(format!(
                "response of {} bytes exceeds the {} byte limit",
                bytes.len(),
                limits.max_response_bytes
            ));
            bytes = response.to_bytes();
        }
        if !response.success {
            summary.failures += 1;
        }

        write_frame(&mut writer, &bytes)?;
        debug!(n = summary.requests, success = response.success, "request served");
    }

    info!(
        requests = summary.requests,
        failures = summary.failures,
        "channel closed by peer"
    );
    Ok(summary)
}

/// [`serve`] over this process's stdin/stdout.
pub fn serve_stdio(handler: &Handler, limits: HostLimits) -> Result<ServeSummary, FrameError> {
    let stdin = io::stdin().lock();
    let stdout = io::stdout().lock();
    serve(stdin, stdout, handler, limits)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::encode_frame;
    use ff_core::config::Config;
    use std::io::Cursor;

    fn frames(payloads: &[&[u8]]) -> Cursor<Vec<u8>> {
        let mut wire = Vec::new();
        for p in payloads {
            wire.extend(encode_frame(p).unwrap());
        }
        Cursor::new(wire)
    }

    fn responses(wire: Vec<u8>) -> Vec<Response> {
        let mut cursor = Cursor::new(wire);
        let mut out = Vec::new();
        while let Some(payload) = read_frame(&mut cursor, u32::MAX).unwrap() {
            out.push(serde_json::from_slice(&payload).unwrap());
        }
        out
    }

    #[test]
    fn errors_do_not_stop_the_loop() {
        let dir = tempfile::tempdir().unwrap();
        let handler = Handler::from_config(&Config::isolated(dir.path()));
        let input = frames(&[
            b"nonsense",
            br#"{"action":"fly"}"#,
            br#"{"action":"add","message":"still here"}"#,
        ]);

        let mut out = Vec::new();
        let summary = serve(input, &mut out, &handler, HostLimits::default()).unwrap();
        assert_eq!(summary, ServeSummary { requests: 3, failures: 2 });

        let resps = responses(out);
        assert_eq!(resps.len(), 3);
        assert!(!resps[0].success);
        assert_eq!(resps[1].error.as_deref(), Some("Unknown action: fly"));
        assert!(resps[2].success);
    }

    #[test]
    fn oversized_response_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let handler = Handler::from_config(&Config::isolated(dir.path()));
        handler.store().append(&"x".repeat(512), None, None).unwrap();

        let limits = HostLimits {
            max_frame_bytes: 1024,
            max_response_bytes: 256,
        };
        let mut out = Vec::new();
        serve(frames(&[br#"{"action":"query","kind":"log"}"#]), &mut out, &handler, limits).unwrap();

        let resps = responses(out);
        assert!(!resps[0].success);
        assert!(resps[0].error.as_deref().unwrap().contains("256 byte limit"));
    }

    #[test]
    fn truncated_frame_ends_session_with_error() {
        let dir = tempfile::tempdir().unwrap();
        let handler = Handler::from_config(&Config::isolated(dir.path()));
        let mut wire = 100u32.to_le_bytes().to_vec();
        wire.extend_from_slice(b"{\"action\"");

        let err = serve(Cursor::new(wire), Vec::new(), &handler, HostLimits::default()).unwrap_err();
        assert!(matches!(err, FrameError::Truncated { expected: 100, .. }));
    }
}
