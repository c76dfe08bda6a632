//! Store: the file-backed event store.
//!
//! Two files under one directory:
//!
//! - `feedback.log`: human-readable, append-only `[timestamp] message` blocks.
//! - `feedback_meta.json`: `{"entries": [...]}` mirroring every block with
//!   the structured fields programmatic consumers need.
//!
//! Every append writes the log first and the metadata second. There is no
//! transaction across the two files and no lock between processes, so a
//! crash between the writes leaves a log block without a metadata entry.
//! The metadata side is self-healing: a missing or unparsable document reads
//! back as empty and the next write replaces it.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

use tracing::{debug, info, warn};

use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::types::{EntryKey, MarkOutcome, MetaDocument, MetaEntry, StoreStatus};

/// Format shared by every timestamp the store writes or compares.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Returned by [`Store::read_log`] when the log has never been written.
pub const LOG_MISSING_SENTINEL: &str = "Feedback log file does not exist.";

/// Current local wall-clock time in [`TIMESTAMP_FORMAT`].
pub fn timestamp() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

fn format_system_time(t: SystemTime) -> String {
    chrono::DateTime::<chrono::Local>::from(t)
        .format(TIMESTAMP_FORMAT)
        .to_string()
}

/// Header written as the only line of a freshly cleared log.
pub fn cleared_header(timestamp: &str) -> String {
    format!("# Feedback Flow Log File - Cleared on {timestamp}\n")
}

// ---------------------------------------------------------------------------
// Raw file helpers
// ---------------------------------------------------------------------------

fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))
        }
        _ => Ok(()),
    }
}

/// Append `content` verbatim to `path`, creating the file and its parent
/// directories on first write.
pub fn append_raw(path: &Path, content: &str) -> Result<()> {
    ensure_parent(path)?;
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| StoreError::io(path, e))?;
    file.write_all(content.as_bytes())
        .and_then(|()| file.flush())
        .map_err(|e| StoreError::io(path, e))
}

/// Truncate `path` and write the cleared header. Returns the header's
/// timestamp.
pub fn clear_raw(path: &Path) -> Result<String> {
    ensure_parent(path)?;
    let ts = timestamp();
    fs::write(path, cleared_header(&ts)).map_err(|e| StoreError::io(path, e))?;
    Ok(ts)
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Handle on one store directory. Constructing a handle performs no I/O;
/// files are created lazily by the first mutating call.
#[derive(Debug, Clone)]
pub struct Store {
    dir: PathBuf,
    log_path: PathBuf,
    meta_path: PathBuf,
}

impl Store {
    /// Store rooted at `dir` with the default file names.
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        let defaults = StoreConfig::default();
        Self::with_files(dir, &defaults.log_file, &defaults.meta_file)
    }

    pub fn from_config(cfg: &StoreConfig) -> Self {
        Self::with_files(cfg.dir_path(), &cfg.log_file, &cfg.meta_file)
    }

    fn with_files(dir: impl Into<PathBuf>, log_file: &str, meta_file: &str) -> Self {
        let dir = dir.into();
        Self {
            log_path: dir.join(log_file),
            meta_path: dir.join(meta_file),
            dir,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    pub fn meta_path(&self) -> &Path {
        &self.meta_path
    }

    fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| StoreError::io(&self.dir, e))
    }

    // -- mutations ----------------------------------------------------------

    /// Append one event. Writes the log block, then rewrites the metadata
    /// document with the new entry at the end. The returned entry's
    /// `timestamp` is the display key; `id` is unambiguous.
    pub fn append(
        &self,
        message: &str,
        source: Option<String>,
        context: Option<serde_json::Map<String, serde_json::Value>>,
    ) -> Result<MetaEntry> {
        self.append_stamped(timestamp(), message, source, context)
    }

    fn append_stamped(
        &self,
        timestamp: String,
        message: &str,
        source: Option<String>,
        context: Option<serde_json::Map<String, serde_json::Value>>,
    ) -> Result<MetaEntry> {
        self.ensure_dir()?;
        append_raw(&self.log_path, &format!("[{timestamp}] {message}\n\n"))?;

        let mut doc = self.load_meta()?;
        let mut entry = MetaEntry::new(doc.next_id(), timestamp, message);
        entry.source = source;
        entry.context = context;
        doc.entries.push(entry.clone());
        self.write_meta(&doc)?;

        debug!(id = entry.id, timestamp = %entry.timestamp, "feedback appended");
        Ok(entry)
    }

    /// Truncate the log to a single cleared header and reset metadata to an
    /// empty document. Returns the clear timestamp.
    pub fn clear(&self) -> Result<String> {
        self.ensure_dir()?;
        let ts = clear_raw(&self.log_path)?;
        self.write_meta(&MetaDocument::default())?;
        info!(timestamp = %ts, dir = %self.dir.display(), "store cleared");
        Ok(ts)
    }

    /// Flag the first entry matching `key` as addressed. An unknown key
    /// leaves the metadata file untouched.
    pub fn mark_addressed(&self, key: &EntryKey, resolution: Option<String>) -> Result<MarkOutcome> {
        let mut doc = self.load_meta()?;

        if let EntryKey::Timestamp(ts) = key {
            let matches = doc.find_by_timestamp(ts).len();
            if matches > 1 {
                warn!(timestamp = %ts, matches, "timestamp is ambiguous; marking first entry");
            }
        }

        let Some(idx) = doc.position(key) else {
            debug!(%key, "no feedback entry to mark");
            return Ok(MarkOutcome::NotFound);
        };

        let entry = &mut doc.entries[idx];
        entry.addressed = true;
        entry.resolution = resolution;
        entry.addressed_at = Some(timestamp());
        self.write_meta(&doc)?;

        info!(%key, "feedback marked addressed");
        Ok(MarkOutcome::Found)
    }

    // -- reads --------------------------------------------------------------

    /// Raw log contents, or `None` if the log has never been written. Never
    /// creates the file.
    pub fn read_log_opt(&self) -> Result<Option<String>> {
        match fs::read(&self.log_path) {
            Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::io(&self.log_path, e)),
        }
    }

    /// Raw log contents, or [`LOG_MISSING_SENTINEL`] when absent.
    pub fn read_log(&self) -> Result<String> {
        Ok(self
            .read_log_opt()?
            .unwrap_or_else(|| LOG_MISSING_SENTINEL.to_string()))
    }

    /// Parsed metadata. Missing or corrupt documents read as empty.
    pub fn read_meta(&self) -> Result<MetaDocument> {
        self.load_meta()
    }

    /// Stat projection of the log file.
    pub fn status(&self) -> Result<StoreStatus> {
        match fs::metadata(&self.log_path) {
            Ok(meta) => Ok(StoreStatus {
                exists: true,
                size_bytes: Some(meta.len()),
                last_modified: meta.modified().ok().map(format_system_time),
                path: self.log_path.clone(),
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(StoreStatus {
                exists: false,
                size_bytes: None,
                last_modified: None,
                path: self.log_path.clone(),
            }),
            Err(e) => Err(StoreError::io(&self.log_path, e)),
        }
    }

    // -- metadata document --------------------------------------------------

    fn load_meta(&self) -> Result<MetaDocument> {
        let bytes = match fs::read(&self.meta_path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(MetaDocument::default()),
            Err(e) => return Err(StoreError::io(&self.meta_path, e)),
        };
        match serde_json::from_slice(&bytes) {
            Ok(doc) => Ok(doc),
            Err(e) => {
                warn!(path = %self.meta_path.display(), error = %e, "metadata unreadable; treating as empty");
                Ok(MetaDocument::default())
            }
        }
    }

    /// Rewrite the whole document through a sibling temp file so readers
    /// never observe a half-written document.
    fn write_meta(&self, doc: &MetaDocument) -> Result<()> {
        self.ensure_dir()?;
        let mut body = serde_json::to_vec_pretty(doc)?;
        body.push(b'\n');

        static SEQ: AtomicU64 = AtomicU64::new(0);
        let seq = SEQ.fetch_add(1, Ordering::Relaxed);
        let tmp = self
            .meta_path
            .with_extension(format!("json.{}.{seq}.tmp", std::process::id()));
        fs::write(&tmp, &body).map_err(|e| StoreError::io(&tmp, e))?;
        fs::rename(&tmp, &self.meta_path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            StoreError::io(&self.meta_path, e)
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
