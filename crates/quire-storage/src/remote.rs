use std::sync::RwLock;

use quire_types::SignedRevision;

/// Errors from a remote authority.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    /// The authority received the revision and refused it.
    #[error("remote authority rejected the revision: {0}")]
    Rejected(String),

    /// The authority could not be reached.
    #[error("remote authority unreachable: {0}")]
    Unreachable(String),
}

/// Upstream destination for flushed revisions.
///
/// `put` is synchronous and must not return until the revision is durably
/// accepted or definitively failed: [`FolderStorage::flush_one`] holds its
/// exclusive lock for the whole call and advances the flush pointer only on
/// success.
///
/// [`FolderStorage::flush_one`]: crate::FolderStorage::flush_one
pub trait RemoteAuthority: Send + Sync {
    fn put(&self, signed: &SignedRevision) -> Result<(), RemoteError>;
}

/// Remote authority that records every accepted revision in memory.
///
/// Useful as a sink in tests and in embedded setups where the "remote" is
/// another component of the same process.
#[derive(Default)]
pub struct InMemoryAuthority {
    received: RwLock<Vec<SignedRevision>>,
}

impl InMemoryAuthority {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every revision accepted so far, in arrival order.
    pub fn received(&self) -> Vec<SignedRevision> {
        self.received
            .read()
            .expect("authority lock poisoned")
            .clone()
    }

    /// Number of revisions accepted so far.
    pub fn len(&self) -> usize {
        self.received.read().expect("authority lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RemoteAuthority for InMemoryAuthority {
    fn put(&self, signed: &SignedRevision) -> Result<(), RemoteError> {
        self.received
            .write()
            .expect("authority lock poisoned")
            .push(signed.clone());
        Ok(())
    }
}
