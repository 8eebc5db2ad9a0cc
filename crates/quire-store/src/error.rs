use std::path::PathBuf;

use quire_types::{CodecError, RevisionId};

/// Errors from object store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested object was not found.
    #[error("object not found: {0}")]
    NotFound(RevisionId),

    /// Stored bytes no longer hash to their identifier (data corruption).
    #[error("integrity mismatch for {id}: stored bytes hash to {computed}")]
    IntegrityMismatch {
        id: RevisionId,
        computed: RevisionId,
    },

    /// Encoding or decoding failure.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// I/O error with the path that produced it.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
