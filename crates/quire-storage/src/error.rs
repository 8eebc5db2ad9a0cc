use quire_auth::AuthError;
use quire_crypto::SuccessorError;
use quire_journal::JournalError;
use quire_store::StoreError;
use quire_types::{BranchId, Revision, UserId};

use crate::remote::RemoteError;

/// Caller-facing errors from [`FolderStorage`](crate::FolderStorage).
///
/// Absence is never an error: an unknown branch reads as `None`, an empty
/// length as 0, an empty range as an empty vec. Everything here is either a
/// rejected request or a genuine failure.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The storage has been shut down; no operation will ever succeed again.
    #[error("folder storage is shut down")]
    Shutdown,

    /// The request itself is malformed, independent of folder state.
    #[error("bad request: {reason}")]
    BadRequest { reason: String },

    /// The requester failed the reader or writer/rekey gate.
    #[error("user {user} is not authorized for this folder")]
    Unauthorized { user: UserId },

    /// Object store failure, including detected on-disk corruption.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The candidate revision is not a valid successor of the current head.
    #[error(transparent)]
    Successor(#[from] SuccessorError),

    /// A journal entry named an object whose record carries a different
    /// revision. The two structures disagree; nothing is repaired.
    #[error("branch {branch} journal expected revision {expected}, object holds {actual}")]
    RevisionDesync {
        branch: BranchId,
        expected: Revision,
        actual: Revision,
    },

    /// Bootstrapping a conflict branch requires exactly one mainline entry
    /// at the candidate's predecessor revision.
    #[error("cannot bootstrap branch at revision {revision}: found {found} mainline predecessors, need exactly 1")]
    BootstrapPredecessor { revision: Revision, found: usize },

    /// Branch journal failure, tagged with the branch it occurred on.
    #[error("journal failure on branch {branch}: {source}")]
    Journal {
        branch: BranchId,
        source: JournalError,
    },

    /// The authorization backend could not answer.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The remote authority refused or could not be reached during a flush.
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

/// Result alias for folder storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
