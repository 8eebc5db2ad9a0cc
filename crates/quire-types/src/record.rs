use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::branch::{BranchId, MergedStatus};
use crate::identity::UserId;
use crate::revision::{Revision, RevisionId};

/// The signed body of a metadata revision.
///
/// A record names its place in history (revision, branch, merged status,
/// predecessor link), the folder's access lists, and an opaque `body` this
/// layer never interprets. Records are immutable once stored; the signature
/// in [`SignedRevision`] covers the record's encoded bytes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionRecord {
    /// Per-branch revision ordinal.
    pub revision: Revision,
    /// The branch this revision belongs to.
    pub branch: BranchId,
    /// Merged/unmerged status; must agree with `branch`.
    pub merged: MergedStatus,
    /// Content identifier of the logical predecessor, `None` for the first
    /// revision of a folder.
    pub predecessor: Option<RevisionId>,
    /// Identity of the user who produced and signed this revision.
    pub author: UserId,
    /// Users allowed to extend this folder's history.
    pub writers: Vec<UserId>,
    /// Users allowed to read this folder's history, in addition to writers.
    pub readers: Vec<UserId>,
    /// Folder key generation; bumped by rekeys, otherwise unchanged.
    pub key_generation: u64,
    /// Opaque metadata payload; semantics belong to the caller.
    pub body: Vec<u8>,
}

impl RevisionRecord {
    /// Create a record with a coherent merged status and the author as the
    /// sole writer. Callers adjust fields as needed before signing.
    pub fn new(revision: Revision, branch: BranchId, author: UserId) -> Self {
        Self {
            revision,
            branch,
            merged: MergedStatus::for_branch(&branch),
            predecessor: None,
            author,
            writers: vec![author],
            readers: Vec::new(),
            key_generation: 1,
            body: Vec::new(),
        }
    }

    /// Returns `true` if `user` is in the writer list.
    pub fn has_writer(&self, user: &UserId) -> bool {
        self.writers.contains(user)
    }

    /// Returns `true` if `user` may read this folder: readers and writers
    /// both qualify.
    pub fn has_reader(&self, user: &UserId) -> bool {
        self.readers.contains(user) || self.writers.contains(user)
    }
}

/// Signature envelope for a revision record.
///
/// Carries the raw Ed25519 signature over the record's encoded bytes and
/// the author's raw verifying key; key parsing and verification live in the
/// crypto layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureInfo {
    /// Ed25519 signature bytes (64 bytes).
    pub signature: Vec<u8>,
    /// Raw Ed25519 verifying key of the author (32 bytes).
    pub verifying_key: [u8; 32],
}

/// The immutable unit of storage: a record plus its signature.
///
/// `untrusted_timestamp` is populated from file modification time when the
/// revision is read back from disk. It is advisory only: never persisted
/// and never covered by the signature.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SignedRevision {
    /// The signed record.
    pub record: RevisionRecord,
    /// Signature over the record's encoded bytes.
    pub sig: SignatureInfo,
    /// Local read-time annotation; not part of the stored bytes.
    #[serde(skip)]
    pub untrusted_timestamp: Option<DateTime<Utc>>,
}

impl SignedRevision {
    /// Assemble a signed revision with no read-time annotation.
    pub fn new(record: RevisionRecord, sig: SignatureInfo) -> Self {
        Self {
            record,
            sig,
            untrusted_timestamp: None,
        }
    }
}
