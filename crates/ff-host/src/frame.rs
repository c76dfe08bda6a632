//! Frame codec: 4-byte little-endian length prefix + payload.
//!
//! The pipe has no message boundaries of its own. A clean close before any
//! prefix byte is end-of-stream; a close partway through a payload is a
//! truncated frame.

use std::io::{self, ErrorKind, Read, Write};

use thiserror::Error;
use tracing::{debug, warn};

/// Width of the length prefix in bytes.
pub const PREFIX_LEN: usize = 4;

/// Transport-level failures. Any of these ends the session.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("channel I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("truncated frame: expected {expected} bytes, received {received}")]
    Truncated { expected: u32, received: usize },

    #[error("frame of {len} bytes exceeds the {max} byte limit")]
    TooLarge { len: u64, max: u32 },
}

/// Read until `buf` is full or the stream closes. Returns bytes read.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Read one frame. `Ok(None)` signals end-of-stream: the caller must stop
/// reading, not retry. Blocks until the whole payload has arrived.
pub fn read_frame<R: Read>(reader: &mut R, max_len: u32) -> Result<Option<Vec<u8>>, FrameError> {
    let mut prefix = [0u8; PREFIX_LEN];
    let got = read_full(reader, &mut prefix)?;
    if got == 0 {
        return Ok(None);
    }
    if got < PREFIX_LEN {
        warn!(bytes = got, "stream closed inside length prefix");
        return Ok(None);
    }

    let len = u32::from_le_bytes(prefix);
    if len > max_len {
        return Err(FrameError::TooLarge {
            len: u64::from(len),
            max: max_len,
        });
    }

    let mut payload = vec![0u8; len as usize];
    let received = read_full(reader, &mut payload)?;
    if received < payload.len() {
        return Err(FrameError::Truncated {
            expected: len,
            received,
        });
    }

    debug!(len, "frame received");
    Ok(Some(payload))
}

fn payload_len(payload: &[u8]) -> Result<u32, FrameError> {
    u32::try_from(payload.len()).map_err(|_| FrameError::TooLarge {
        len: payload.len() as u64,
        max: u32::MAX,
    })
}

/// Prefix `payload` with its length.
pub fn encode_frame(payload: &[u8]) -> Result<Vec<u8>, FrameError> {
    let len = payload_len(payload)?;
    let mut out = Vec::with_capacity(PREFIX_LEN + payload.len());
    out.extend_from_slice(&len.to_le_bytes());
    out.extend_from_slice(payload);
    Ok(out)
}

/// Write one frame and flush. The peer blocks on the next frame, so an
/// unflushed buffer would stall both sides.
pub fn write_frame<W: Write>(writer: &mut W, payload: &[u8]) -> Result<(), FrameError> {
    let len = payload_len(payload)?;
    writer.write_all(&len.to_le_bytes())?;
    writer.write_all(payload)?;
    writer.flush()?;
    debug!(len, "frame sent");
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
