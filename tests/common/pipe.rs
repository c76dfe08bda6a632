//! In-memory anonymous pipe for driving the host loop from a test thread.
//!
//! The writer half only hands bytes to the reader on `flush()`, the way a
//! buffered stdout behaves when the peer is another process. A host that
//! forgets to flush therefore leaves the client waiting, and the client's
//! read times out instead of hanging the test run.

use std::io::{self, Read, Write};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

/// How long a test client waits for a response frame.
pub const PIPE_TIMEOUT: Duration = Duration::from_secs(5);

/// Writing end. Dropping it closes the pipe.
pub struct PipeWriter {
    tx: Sender<Vec<u8>>,
    pending: Vec<u8>,
}

impl Write for PipeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let chunk = std::mem::take(&mut self.pending);
        self.tx
            .send(chunk)
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "reader dropped"))
    }
}

/// Reading end. Blocks until a flushed chunk arrives or the writer is gone.
pub struct PipeReader {
    rx: Receiver<Vec<u8>>,
    buf: Vec<u8>,
    pos: usize,
    timeout: Option<Duration>,
}

impl PipeReader {
    /// Fail reads with `TimedOut` instead of blocking forever.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl Read for PipeReader {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        if self.pos == self.buf.len() {
            let next = match self.timeout {
                Some(t) => match self.rx.recv_timeout(t) {
                    Ok(chunk) => Some(chunk),
                    Err(RecvTimeoutError::Disconnected) => None,
                    Err(RecvTimeoutError::Timeout) => {
                        return Err(io::Error::new(io::ErrorKind::TimedOut, "no flushed data"))
                    }
                },
                None => self.rx.recv().ok(),
            };
            match next {
                Some(chunk) => {
                    self.buf = chunk;
                    self.pos = 0;
                }
                None => return Ok(0),
            }
        }
        let n = out.len().min(self.buf.len() - self.pos);
        out[..n].copy_from_slice(&self.buf[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

/// Create a connected writer/reader pair.
pub fn pipe() -> (PipeWriter, PipeReader) {
    let (tx, rx) = mpsc::channel();
    (
        PipeWriter {
            tx,
            pending: Vec::new(),
        },
        PipeReader {
            rx,
            buf: Vec::new(),
            pos: 0,
            timeout: None,
        },
    )
}
