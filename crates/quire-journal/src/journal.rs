use std::fs;
use std::path::{Path, PathBuf};

use quire_types::{Revision, RevisionId};
use tracing::debug;

use crate::error::{JournalError, JournalResult};

const EARLIEST_MARKER: &str = "EARLIEST";
const LATEST_MARKER: &str = "LATEST";

/// Append-only revision journal for a single branch.
///
/// Entry files are named by the 16-char zero-padded hex form of their
/// revision and hold the 64-char hex content identifier. The `EARLIEST` and
/// `LATEST` markers hold a revision in the same hex form. The journal keeps
/// no in-memory state; every operation reads the markers from disk, so the
/// caller is responsible for mutual exclusion across operations. Handles are
/// cheap to clone; clones share the same directory.
#[derive(Clone, Debug)]
pub struct BranchJournal {
    dir: PathBuf,
}

impl BranchJournal {
    /// Open (or create) the journal directory.
    pub fn open(dir: &Path) -> JournalResult<Self> {
        fs::create_dir_all(dir).map_err(|e| JournalError::Io {
            path: dir.to_path_buf(),
            source: e,
        })?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    /// Revision named by the `EARLIEST` marker, or `None` before any append.
    pub fn earliest_revision(&self) -> JournalResult<Option<Revision>> {
        self.read_marker(EARLIEST_MARKER)
    }

    /// Revision named by the `LATEST` marker, or `None` before any append.
    pub fn latest_revision(&self) -> JournalResult<Option<Revision>> {
        self.read_marker(LATEST_MARKER)
    }

    /// The entry at the latest revision, or `None` if nothing was ever
    /// appended.
    ///
    /// A drained journal (earliest advanced past latest) still reports its
    /// head: the tip remains the anchor that future appends chain from.
    pub fn head(&self) -> JournalResult<Option<(Revision, RevisionId)>> {
        match self.latest_revision()? {
            None => Ok(None),
            Some(latest) => Ok(Some((latest, self.read_entry(latest)?))),
        }
    }

    /// The entry at the earliest pointer; `None` when the journal is empty
    /// or fully drained.
    pub fn earliest_entry(&self) -> JournalResult<Option<(Revision, RevisionId)>> {
        let (Some(earliest), Some(latest)) = (self.earliest_revision()?, self.latest_revision()?)
        else {
            return Ok(None);
        };
        if earliest > latest {
            return Ok(None);
        }
        Ok(Some((earliest, self.read_entry(earliest)?)))
    }

    /// Append an entry.
    ///
    /// The first entry may carry any revision and sets both markers. Every
    /// later append must carry exactly `latest + 1`; anything else fails
    /// with [`JournalError::Discontinuity`] and leaves the journal unchanged.
    pub fn append(&self, revision: Revision, id: &RevisionId) -> JournalResult<()> {
        if let Some(latest) = self.latest_revision()? {
            if revision != latest.next() {
                return Err(JournalError::Discontinuity {
                    expected: latest.next(),
                    actual: revision,
                });
            }
        }

        // Entry before LATEST: a torn append must never leave the marker
        // naming a revision without an entry file.
        self.write_entry(revision, id)?;
        if self.earliest_revision()?.is_none() {
            self.write_marker(EARLIEST_MARKER, revision)?;
        }
        self.write_marker(LATEST_MARKER, revision)?;

        debug!(revision = revision.value(), id = %id.short_hex(), "journal append");
        Ok(())
    }

    /// Entries overlapping `[start, stop]`, clipped to the retained window.
    ///
    /// Returns the revision the returned run actually begins at together
    /// with the identifiers in revision order, or `None` when the overlap
    /// is empty (including on an empty or drained journal).
    pub fn range(
        &self,
        start: Revision,
        stop: Revision,
    ) -> JournalResult<Option<(Revision, Vec<RevisionId>)>> {
        let (Some(earliest), Some(latest)) = (self.earliest_revision()?, self.latest_revision()?)
        else {
            return Ok(None);
        };

        let start = start.max(earliest);
        let stop = stop.min(latest);
        if stop < start {
            return Ok(None);
        }

        let mut ids = Vec::with_capacity((stop.value() - start.value() + 1) as usize);
        let mut revision = start;
        while revision <= stop {
            ids.push(self.read_entry(revision)?);
            revision = revision.next();
        }
        Ok(Some((start, ids)))
    }

    /// Number of entries in the retained window; 0 when empty or drained.
    pub fn len(&self) -> JournalResult<u64> {
        match (self.earliest_revision()?, self.latest_revision()?) {
            (Some(earliest), Some(latest)) if earliest <= latest => {
                Ok(latest.value() - earliest.value() + 1)
            }
            _ => Ok(0),
        }
    }

    /// Whether the retained window holds no entries.
    pub fn is_empty(&self) -> JournalResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Move the earliest pointer forward, logically excluding entries below
    /// it without deleting their files.
    ///
    /// The pointer never moves backward and never goes past `latest + 1`
    /// (the fully-drained position). Advancing to the current position is a
    /// no-op.
    pub fn advance_earliest(&self, new_earliest: Revision) -> JournalResult<()> {
        let Some(current) = self.earliest_revision()? else {
            return Err(JournalError::InvalidAdvance {
                requested: new_earliest,
                reason: "journal has no entries".into(),
            });
        };
        if new_earliest < current {
            return Err(JournalError::InvalidAdvance {
                requested: new_earliest,
                reason: format!("earliest pointer is already at {current}"),
            });
        }

        let Some(latest) = self.latest_revision()? else {
            return Err(JournalError::Corrupt {
                path: self.marker_path(LATEST_MARKER),
                reason: "LATEST marker missing while EARLIEST exists".into(),
            });
        };
        if new_earliest > latest.next() {
            return Err(JournalError::InvalidAdvance {
                requested: new_earliest,
                reason: format!("beyond latest revision {latest}"),
            });
        }

        if new_earliest == current {
            return Ok(());
        }
        self.write_marker(EARLIEST_MARKER, new_earliest)?;
        debug!(earliest = new_earliest.value(), "advanced earliest pointer");
        Ok(())
    }

    fn marker_path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    fn read_marker(&self, name: &str) -> JournalResult<Option<Revision>> {
        let path = self.marker_path(name);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(JournalError::Io { path, source: e }),
        };
        let revision = Revision::from_hex_name(&content).map_err(|e| JournalError::Corrupt {
            path,
            reason: e.to_string(),
        })?;
        Ok(Some(revision))
    }

    fn write_marker(&self, name: &str, revision: Revision) -> JournalResult<()> {
        let path = self.marker_path(name);
        fs::write(&path, revision.to_hex_name()).map_err(|e| JournalError::Io {
            path,
            source: e,
        })
    }

    fn entry_path(&self, revision: Revision) -> PathBuf {
        self.dir.join(revision.to_hex_name())
    }

    fn read_entry(&self, revision: Revision) -> JournalResult<RevisionId> {
        let path = self.entry_path(revision);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(JournalError::MissingEntry { revision });
            }
            Err(e) => return Err(JournalError::Io { path, source: e }),
        };
        RevisionId::from_hex(content.trim()).map_err(|e| JournalError::Corrupt {
            path,
            reason: e.to_string(),
        })
    }

    fn write_entry(&self, revision: Revision, id: &RevisionId) -> JournalResult<()> {
        let path = self.entry_path(revision);
        fs::write(&path, id.to_hex()).map_err(|e| JournalError::Io { path, source: e })
    }
}
