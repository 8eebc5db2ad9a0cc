use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, info, warn};

use quire_auth::Authorizer;
use quire_crypto::RevisionCrypto;
use quire_journal::BranchJournal;
use quire_store::ObjectStore;
use quire_types::{BranchId, Revision, RevisionCodec, SignedRevision, UserId};

use crate::error::{StorageError, StorageResult};
use crate::remote::RemoteAuthority;

const JOURNALS_DIR: &str = "branch_journals";

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

/// Lifecycle of a storage instance. The transition to `Shutdown` happens
/// once and is never reversed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Lifecycle {
    Active,
    Shutdown,
}

// ---------------------------------------------------------------------------
// Inner state
// ---------------------------------------------------------------------------

/// Everything the storage lock protects. All filesystem access goes through
/// fields of this struct while a guard is held, so each operation sees one
/// consistent snapshot of the folder.
struct Inner {
    lifecycle: Lifecycle,
    store: ObjectStore,
    /// Branch journals created by writes during this instance's lifetime.
    /// Read paths fall back to a disk probe for journals persisted by an
    /// earlier instance.
    journals: HashMap<BranchId, BranchJournal>,
}

impl Inner {
    fn check_active(&self) -> StorageResult<()> {
        if self.lifecycle == Lifecycle::Shutdown {
            return Err(StorageError::Shutdown);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FolderStorage
// ---------------------------------------------------------------------------

/// Storage engine for a single folder's metadata revision history.
///
/// One instance owns a folder root containing the shared object store and
/// one journal directory per branch. A single coarse reader/writer lock
/// covers the lifecycle flag, the journal index, and the object store;
/// reads run concurrently with reads, while `write`, `flush_one`, and
/// `shutdown` exclude everything.
///
/// Writer and reader authority are always judged against the head of the
/// merged mainline, never against a conflict branch, so a forked writer
/// cannot grant themselves access the canonical history denies.
pub struct FolderStorage {
    root: PathBuf,
    crypto: Arc<dyn RevisionCrypto>,
    authorizer: Arc<dyn Authorizer>,
    inner: RwLock<Inner>,
}

impl FolderStorage {
    /// Open a folder rooted at `root`, creating the object store directory
    /// if needed. Branch journal directories are created lazily on first
    /// write to each branch.
    pub fn open(
        root: &Path,
        codec: Arc<dyn RevisionCodec>,
        crypto: Arc<dyn RevisionCrypto>,
        authorizer: Arc<dyn Authorizer>,
    ) -> StorageResult<Self> {
        let store = ObjectStore::open(root, codec)?;
        info!(root = %root.display(), "folder storage opened");
        Ok(Self {
            root: root.to_path_buf(),
            crypto,
            authorizer,
            inner: RwLock::new(Inner {
                lifecycle: Lifecycle::Active,
                store,
                journals: HashMap::new(),
            }),
        })
    }

    /// Number of journal entries currently held for `branch`, 0 for a
    /// branch this folder has never seen. Requires no authorization; the
    /// count reveals no revision content.
    pub fn journal_length(&self, branch: &BranchId) -> StorageResult<u64> {
        let inner = self.read_inner();
        inner.check_active()?;
        match self.resolve_journal(&inner, branch)? {
            Some(journal) => journal
                .len()
                .map_err(|source| StorageError::Journal { branch: *branch, source }),
            None => Ok(0),
        }
    }

    /// Current head revision of `branch`, or `None` for an unknown branch
    /// or an uninitialized folder. The requester must be a reader of the
    /// folder as defined by the merged mainline head.
    pub fn read_head(
        &self,
        requester: &UserId,
        branch: &BranchId,
    ) -> StorageResult<Option<SignedRevision>> {
        let inner = self.read_inner();
        inner.check_active()?;
        self.check_reader(&inner, requester)?;
        self.branch_head(&inner, branch)
    }

    /// All revisions of `branch` within `[start, stop]`, in revision order,
    /// clipped to what the journal holds. An empty result is not an error.
    ///
    /// Every returned record is checked against the revision the journal
    /// promised for it; disagreement is reported as
    /// [`StorageError::RevisionDesync`], never repaired.
    pub fn read_range(
        &self,
        requester: &UserId,
        branch: &BranchId,
        start: Revision,
        stop: Revision,
    ) -> StorageResult<Vec<SignedRevision>> {
        let inner = self.read_inner();
        inner.check_active()?;
        self.check_reader(&inner, requester)?;
        self.load_range(&inner, branch, start, stop)
    }

    /// Accept a signed revision into its branch.
    ///
    /// The pipeline, in order: branch/status coherence, the writer-or-rekey
    /// gate against the merged mainline head, conflict-branch bootstrap for
    /// the first write on an unmerged branch, successor validation against
    /// the branch head, then the object write and journal append.
    ///
    /// Returns `true` exactly when this call recorded the first revision of
    /// a new conflict branch, so the caller can track the branch mapping.
    pub fn write(&self, requester: &UserId, signed: &SignedRevision) -> StorageResult<bool> {
        let mut inner = self.write_inner();
        inner.check_active()?;

        let record = &signed.record;
        let branch = record.branch;

        if !record.merged.matches_branch(&branch) {
            return Err(StorageError::BadRequest {
                reason: format!("{} status does not match branch {}", record.merged, branch),
            });
        }
        if record.revision < Revision::FIRST {
            return Err(StorageError::BadRequest {
                reason: format!("revision {} is below the first valid ordinal", record.revision),
            });
        }

        // Write authority is judged against the canonical history even for
        // conflict-branch writes.
        let mainline_head = self.branch_head(&inner, &BranchId::MERGED)?;
        if !self
            .authorizer
            .is_writer_or_valid_rekey(requester, mainline_head.as_ref(), signed)?
        {
            return Err(StorageError::Unauthorized { user: *requester });
        }

        let mut head = if branch.is_merged() {
            mainline_head
        } else {
            self.branch_head(&inner, &branch)?
        };

        // First write on an unmerged branch forks from the mainline: the
        // candidate's predecessor revision must exist there, exactly once,
        // and becomes the anchor for successor validation.
        let mut new_branch_recorded = false;
        if !branch.is_merged() && head.is_none() {
            let revision = record.revision;
            let Some(predecessor) = revision.prev() else {
                return Err(StorageError::BootstrapPredecessor { revision, found: 0 });
            };
            let mut found =
                self.load_range(&inner, &BranchId::MERGED, predecessor, predecessor)?;
            if found.len() != 1 {
                return Err(StorageError::BootstrapPredecessor {
                    revision,
                    found: found.len(),
                });
            }
            head = found.pop();
            new_branch_recorded = true;
        }

        if let Some(anchor) = &head {
            self.crypto.validate_successor(anchor, signed)?;
        }

        let id = inner.store.put(signed)?;
        let journal = self.journal_mut(&mut inner, &branch)?;
        journal
            .append(record.revision, &id)
            .map_err(|source| StorageError::Journal { branch, source })?;

        debug!(
            branch = %branch,
            revision = %record.revision,
            id = %id.short_hex(),
            new_branch_recorded,
            "revision accepted",
        );
        Ok(new_branch_recorded)
    }

    /// Send the oldest unflushed revision of `branch` to `remote`, then
    /// advance the flush pointer past it. A branch with nothing to flush is
    /// a no-op. The remote call runs with the exclusive lock held, so a
    /// successful flush is ordered against every other operation and no
    /// revision is ever sent twice.
    pub fn flush_one(
        &self,
        remote: &dyn RemoteAuthority,
        branch: &BranchId,
    ) -> StorageResult<()> {
        let inner = self.write_inner();
        inner.check_active()?;

        let Some(journal) = self.resolve_journal(&inner, branch)? else {
            return Ok(());
        };
        let earliest = journal
            .earliest_entry()
            .map_err(|source| StorageError::Journal { branch: *branch, source })?;
        let Some((revision, id)) = earliest else {
            return Ok(());
        };

        let signed = inner.store.get(&id)?;
        remote.put(&signed)?;
        journal
            .advance_earliest(revision.next())
            .map_err(|source| StorageError::Journal { branch: *branch, source })?;

        debug!(branch = %branch, revision = %revision, "flushed revision to remote");
        Ok(())
    }

    /// Shut the storage down. Every subsequent operation fails with
    /// [`StorageError::Shutdown`] before touching disk or network. Calling
    /// this again is a no-op.
    pub fn shutdown(&self) {
        let mut inner = self.write_inner();
        if inner.lifecycle == Lifecycle::Shutdown {
            return;
        }
        inner.lifecycle = Lifecycle::Shutdown;
        inner.journals.clear();
        debug!(root = %self.root.display(), "folder storage shut down");
    }

    // -----------------------------------------------------------------------
    // Lock-held helpers
    //
    // The storage lock is not reentrant. Helpers borrow the already-locked
    // state instead of taking the lock themselves.
    // -----------------------------------------------------------------------

    fn read_inner(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().expect("storage lock poisoned")
    }

    fn write_inner(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().expect("storage lock poisoned")
    }

    fn journal_dir(&self, branch: &BranchId) -> PathBuf {
        self.root.join(JOURNALS_DIR).join(branch.to_hex())
    }

    /// Journal handle for `branch` if the branch exists: from the index if
    /// this instance has written to it, otherwise from a directory a prior
    /// instance left on disk. Never creates anything.
    fn resolve_journal(
        &self,
        inner: &Inner,
        branch: &BranchId,
    ) -> StorageResult<Option<BranchJournal>> {
        if let Some(journal) = inner.journals.get(branch) {
            return Ok(Some(journal.clone()));
        }
        let dir = self.journal_dir(branch);
        if !dir.is_dir() {
            return Ok(None);
        }
        let journal = BranchJournal::open(&dir)
            .map_err(|source| StorageError::Journal { branch: *branch, source })?;
        Ok(Some(journal))
    }

    /// Journal for `branch`, creating its directory and index entry on
    /// first write.
    fn journal_mut<'a>(
        &self,
        inner: &'a mut Inner,
        branch: &BranchId,
    ) -> StorageResult<&'a BranchJournal> {
        match inner.journals.entry(*branch) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let dir = self.journal_dir(branch);
                let journal = BranchJournal::open(&dir)
                    .map_err(|source| StorageError::Journal { branch: *branch, source })?;
                Ok(entry.insert(journal))
            }
        }
    }

    fn branch_head(
        &self,
        inner: &Inner,
        branch: &BranchId,
    ) -> StorageResult<Option<SignedRevision>> {
        let Some(journal) = self.resolve_journal(inner, branch)? else {
            return Ok(None);
        };
        let head = journal
            .head()
            .map_err(|source| StorageError::Journal { branch: *branch, source })?;
        let Some((_revision, id)) = head else {
            return Ok(None);
        };
        Ok(Some(inner.store.get(&id)?))
    }

    fn check_reader(&self, inner: &Inner, requester: &UserId) -> StorageResult<()> {
        let mainline_head = self.branch_head(inner, &BranchId::MERGED)?;
        if !self.authorizer.is_reader(requester, mainline_head.as_ref())? {
            return Err(StorageError::Unauthorized { user: *requester });
        }
        Ok(())
    }

    /// Load `[start, stop]` from the branch journal and verify each record
    /// carries the revision its journal entry promised.
    fn load_range(
        &self,
        inner: &Inner,
        branch: &BranchId,
        start: Revision,
        stop: Revision,
    ) -> StorageResult<Vec<SignedRevision>> {
        let Some(journal) = self.resolve_journal(inner, branch)? else {
            return Ok(Vec::new());
        };
        let window = journal
            .range(start, stop)
            .map_err(|source| StorageError::Journal { branch: *branch, source })?;
        let Some((actual_start, ids)) = window else {
            return Ok(Vec::new());
        };

        let mut out = Vec::with_capacity(ids.len());
        let mut expected = actual_start;
        for id in &ids {
            let signed = inner.store.get(id)?;
            let actual = signed.record.revision;
            if actual != expected {
                warn!(
                    branch = %branch,
                    expected = %expected,
                    actual = %actual,
                    "journal entry and stored object disagree on revision",
                );
                return Err(StorageError::RevisionDesync {
                    branch: *branch,
                    expected,
                    actual,
                });
            }
            out.push(signed);
            expected = expected.next();
        }
        Ok(out)
    }
}

impl fmt::Debug for FolderStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FolderStorage")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}
