//! Error types for ff-core.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by [`Store`](crate::Store) operations.
///
/// A missing or unparsable metadata document is never an error: it is read
/// back as an empty document. Only genuine filesystem or encoding failures
/// surface here.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem failure while reading or writing a store file.
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The metadata document could not be encoded.
    #[error("failed to encode metadata: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
