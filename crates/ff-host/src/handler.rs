//! Request handler: maps decoded requests onto store operations.

use std::path::{Component, Path, PathBuf};

use ff_core::config::Config;
use ff_core::store::{append_raw, clear_raw};
use ff_core::{EntryKey, MarkOutcome, Store, StoreError};
use tracing::{error, warn};

use crate::protocol::{QueryKind, Request, RequestError, Response};

/// Serves requests against one store. Raw write/clear paths are resolved
/// against `base_dir`.
#[derive(Debug, Clone)]
pub struct Handler {
    store: Store,
    base_dir: PathBuf,
}

impl Handler {
    pub fn new(store: Store, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            base_dir: base_dir.into(),
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(Store::from_config(&cfg.store), cfg.host.base_dir_path())
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Decode and serve one frame payload. Never fails: every error becomes a
    /// failure response.
    pub fn handle_frame(&self, payload: &[u8]) -> Response {
        let result = Request::decode(payload).and_then(|req| {
            let action = req.action();
            self.handle(req).inspect_err(|e| {
                error!(action, error = %e, "request failed");
            })
        });
        match result {
            Ok(resp) => resp,
            Err(e) => {
                if !matches!(e, RequestError::Store(_) | RequestError::Invalid(_)) {
                    warn!(error = %e, "rejected frame");
                }
                Response::from(&e)
            }
        }
    }

    /// Serve one decoded request.
    pub fn handle(&self, req: Request) -> Result<Response, RequestError> {
        match req {
            Request::WriteFeedback { path, content } => {
                let target = self.resolve(&path);
                append_raw(&target, &content)?;
                Ok(Response::ok())
            }
            Request::ClearFeedback { path } => {
                let target = self.resolve(&path);
                let ts = if target == self.store.log_path() {
                    self.store.clear()?
                } else {
                    clear_raw(&target)?
                };
                Ok(Response::ok().with("timestamp", ts))
            }
            Request::Add {
                message,
                source,
                context,
            } => {
                let entry = self.store.append(&message, source, context)?;
                Ok(Response::ok()
                    .with("timestamp", entry.timestamp)
                    .with("id", entry.id))
            }
            Request::MarkAddressed {
                timestamp,
                id,
                resolution,
            } => {
                let key = match (id, timestamp) {
                    (Some(id), _) => EntryKey::Id(id),
                    (None, Some(ts)) => EntryKey::Timestamp(ts),
                    (None, None) => {
                        return Err(RequestError::Invalid(
                            "markAddressed needs a timestamp or an id".to_string(),
                        ))
                    }
                };
                Ok(match self.store.mark_addressed(&key, resolution)? {
                    MarkOutcome::Found => Response::ok().with("found", true),
                    MarkOutcome::NotFound => {
                        Response::failure(format!("No feedback entry found with {key}"))
                            .with("found", false)
                    }
                })
            }
            Request::Query { kind } => self.query(kind),
        }
    }

    fn query(&self, kind: QueryKind) -> Result<Response, RequestError> {
        let resp = match kind {
            QueryKind::Log => {
                let log = self.store.read_log_opt()?;
                Response::ok()
                    .with("exists", log.is_some())
                    .with("log", log.unwrap_or_default())
            }
            QueryKind::Status => {
                let status = serde_json::to_value(self.store.status()?).map_err(StoreError::from)?;
                Response::ok().with("status", status)
            }
            QueryKind::Meta => {
                let meta = serde_json::to_value(self.store.read_meta()?).map_err(StoreError::from)?;
                Response::ok().with("meta", meta)
            }
        };
        Ok(resp)
    }

    /// Join a caller-supplied path onto the base directory. Absolute and
    /// parent-escaping paths are passed through unchanged.
    fn resolve(&self, raw: &str) -> PathBuf {
        let path = Path::new(raw);
        if path.is_absolute() || path.components().any(|c| c == Component::ParentDir) {
            warn!(path = raw, "request path escapes the base directory");
        }
        self.base_dir.join(path)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
