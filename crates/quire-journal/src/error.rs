use std::path::PathBuf;

use quire_types::Revision;

/// Errors from branch journal operations.
#[derive(Debug, thiserror::Error)]
pub enum JournalError {
    /// Append would break ordinal continuity. The journal is unchanged.
    #[error("append out of order: expected revision {expected}, got {actual}")]
    Discontinuity { expected: Revision, actual: Revision },

    /// A marker promised a revision whose entry file does not exist.
    #[error("journal entry missing for revision {revision}")]
    MissingEntry { revision: Revision },

    /// A marker or entry file holds bytes that do not parse.
    #[error("corrupt journal data at {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    /// The earliest pointer only moves forward, at most one past latest.
    #[error("cannot advance earliest to {requested}: {reason}")]
    InvalidAdvance { requested: Revision, reason: String },

    /// I/O error with the path that produced it.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Result alias for journal operations.
pub type JournalResult<T> = Result<T, JournalError>;
