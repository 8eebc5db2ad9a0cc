use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use quire_crypto::RecordHasher;
use quire_types::{RevisionCodec, RevisionId, SignedRevision};
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};

/// Disk-backed, content-addressed store for signed revisions.
///
/// Objects live under `<root>/objects/<first 4 hex>/<remaining hex>` where
/// the hex string is the object's identifier: the hash of exactly the bytes
/// in the file. Writes are atomic (tempfile in the target directory, then
/// rename) and existing objects are never modified or deleted.
pub struct ObjectStore {
    objects_dir: PathBuf,
    codec: Arc<dyn RevisionCodec>,
}

impl ObjectStore {
    /// Open (or create) the object store under the given folder root.
    pub fn open(root: &Path, codec: Arc<dyn RevisionCodec>) -> StoreResult<Self> {
        let objects_dir = root.join("objects");
        fs::create_dir_all(&objects_dir).map_err(|e| StoreError::Io {
            path: objects_dir.clone(),
            source: e,
        })?;
        Ok(Self { objects_dir, codec })
    }

    /// Store a signed revision, returning its content identifier.
    ///
    /// Idempotent: if an object with this identifier already exists, the
    /// bytes on disk are the same bytes and the write is skipped.
    pub fn put(&self, signed: &SignedRevision) -> StoreResult<RevisionId> {
        let bytes = self.codec.encode(signed)?;
        let id = RecordHasher::REVISION.hash(&bytes);
        let (dir, file) = self.object_paths(&id);

        let exists = file.try_exists().map_err(|e| StoreError::Io {
            path: file.clone(),
            source: e,
        })?;
        if exists {
            return Ok(id);
        }

        fs::create_dir_all(&dir).map_err(|e| StoreError::Io {
            path: dir.clone(),
            source: e,
        })?;
        let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(|e| StoreError::Io {
            path: dir.clone(),
            source: e,
        })?;
        tmp.write_all(&bytes).map_err(|e| StoreError::Io {
            path: file.clone(),
            source: e,
        })?;
        tmp.persist(&file).map_err(|e| StoreError::Io {
            path: file.clone(),
            source: e.error,
        })?;

        debug!(id = %id.short_hex(), len = bytes.len(), "stored revision object");
        Ok(id)
    }

    /// Load a signed revision by identifier.
    ///
    /// The stored bytes are re-hashed before decoding; disagreement with the
    /// identifier is reported as corruption, never repaired. The result is
    /// annotated with the file's modification time as an untrusted local
    /// timestamp.
    pub fn get(&self, id: &RevisionId) -> StoreResult<SignedRevision> {
        let (_, file) = self.object_paths(id);
        let bytes = match fs::read(&file) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(*id));
            }
            Err(e) => {
                return Err(StoreError::Io {
                    path: file,
                    source: e,
                });
            }
        };

        let computed = RecordHasher::REVISION.hash(&bytes);
        if computed != *id {
            warn!(
                id = %id.short_hex(),
                computed = %computed.short_hex(),
                "stored object fails integrity check"
            );
            return Err(StoreError::IntegrityMismatch { id: *id, computed });
        }

        let mut signed = self.codec.decode(&bytes)?;
        signed.untrusted_timestamp = modified_time(&file);
        Ok(signed)
    }

    /// Whether an object with this identifier exists on disk.
    pub fn contains(&self, id: &RevisionId) -> StoreResult<bool> {
        let (_, file) = self.object_paths(id);
        file.try_exists().map_err(|e| StoreError::Io {
            path: file,
            source: e,
        })
    }

    /// Splay directory and object file for an identifier.
    fn object_paths(&self, id: &RevisionId) -> (PathBuf, PathBuf) {
        let hex = id.to_hex();
        let dir = self.objects_dir.join(&hex[..4]);
        let file = dir.join(&hex[4..]);
        (dir, file)
    }
}

impl std::fmt::Debug for ObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectStore")
            .field("objects_dir", &self.objects_dir)
            .finish()
    }
}

/// Best-effort file modification time; `None` if the filesystem cannot say.
fn modified_time(path: &Path) -> Option<DateTime<Utc>> {
    let modified = fs::metadata(path).and_then(|m| m.modified()).ok()?;
    Some(modified.into())
}
