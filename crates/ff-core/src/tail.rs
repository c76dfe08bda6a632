//! Tailer: follows growth of the feedback log by polling its size.
//!
//! No filesystem-notification dependency: each iteration stats the file and
//! compares the size against the last one observed. Growth emits exactly the
//! new suffix; a shrink (a concurrent clear) only resets the recorded size so
//! the next comparison starts from the new length.
//!
//! ```text
//! initial ──► polling ──► grew? ──► read suffix, emit, record size ──► polling
//!                 │
//!                 └──► shrunk? ──► record smaller size ──► polling
//! ```

use std::fs::File;
use std::future::Future;
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::{Result, StoreError};

/// Outcome of one [`Tailer::poll_once`] iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TailEvent {
    Unchanged,
    /// Bytes appended since the previous poll (lossy UTF-8).
    Grew(String),
    /// File got smaller; nothing is emitted.
    Shrunk { from: u64, to: u64 },
    /// File is absent; recorded size is reset to zero.
    Missing,
}

/// Polling reader over one file. Never writes.
#[derive(Debug)]
pub struct Tailer {
    path: PathBuf,
    last_size: u64,
}

impl Tailer {
    /// Start tailing `path` from its current end. A missing file starts at
    /// zero so its first contents are emitted once it appears.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let last_size = current_size(&path)?.unwrap_or(0);
        Ok(Self { path, last_size })
    }

    /// Start at an explicit offset.
    pub fn from_offset(path: impl Into<PathBuf>, offset: u64) -> Self {
        Self {
            path: path.into(),
            last_size: offset,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Size recorded at the end of the last iteration.
    pub fn last_size(&self) -> u64 {
        self.last_size
    }

    /// One synchronous poll iteration.
    pub fn poll_once(&mut self) -> Result<TailEvent> {
        let Some(size) = current_size(&self.path)? else {
            self.last_size = 0;
            return Ok(TailEvent::Missing);
        };

        if size == self.last_size {
            return Ok(TailEvent::Unchanged);
        }

        if size < self.last_size {
            let from = self.last_size;
            self.last_size = size;
            debug!(path = %self.path.display(), from, to = size, "log shrank");
            return Ok(TailEvent::Shrunk { from, to: size });
        }

        let suffix = self.read_range(self.last_size, size)?;
        self.last_size = size;
        Ok(TailEvent::Grew(String::from_utf8_lossy(&suffix).into_owned()))
    }

    /// Bytes in `[from, to)`. Anything written after the stat is left for
    /// the next iteration.
    fn read_range(&self, from: u64, to: u64) -> Result<Vec<u8>> {
        let io_err = |e| StoreError::io(&self.path, e);
        let mut file = File::open(&self.path).map_err(io_err)?;
        file.seek(SeekFrom::Start(from)).map_err(io_err)?;

        let mut buf = Vec::with_capacity((to - from) as usize);
        file.take(to - from).read_to_end(&mut buf).map_err(io_err)?;
        Ok(buf)
    }

    /// Poll every `interval`, passing each growth suffix to `emit`, until
    /// `shutdown` resolves. I/O errors are logged and the loop keeps going.
    pub async fn follow<F, S>(&mut self, interval: Duration, mut emit: F, shutdown: S)
    where
        F: FnMut(&str),
        S: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    debug!(path = %self.path.display(), "tail stopped");
                    return;
                }
                _ = ticker.tick() => match self.poll_once() {
                    Ok(TailEvent::Grew(text)) => emit(&text),
                    Ok(_) => {}
                    Err(e) => warn!(error = %e, "tail poll failed"),
                },
            }
        }
    }
}

fn current_size(path: &Path) -> Result<Option<u64>> {
    match std::fs::metadata(path) {
        Ok(meta) => Ok(Some(meta.len())),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(StoreError::io(path, e)),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
