//! Folder-level coordination of revision storage.
//!
//! [`FolderStorage`] ties the lower layers together for a single folder: the
//! content-addressed object store holds every accepted revision, one branch
//! journal per branch orders them, and a single coarse reader/writer lock
//! makes each operation an atomic snapshot of the folder's state.
//!
//! Writes run the full acceptance pipeline: branch/status coherence, the
//! writer-or-rekey gate against the merged mainline head, conflict-branch
//! bootstrap from the mainline, and cryptographic successor validation.
//! Reads are gated on folder readership. [`flush_one`] pushes the oldest
//! unflushed revision of a branch to a [`RemoteAuthority`], one at a time,
//! in revision order.
//!
//! [`flush_one`]: FolderStorage::flush_one

pub mod error;
pub mod remote;
pub mod storage;

pub use error::{StorageError, StorageResult};
pub use remote::{InMemoryAuthority, RemoteAuthority, RemoteError};
pub use storage::FolderStorage;
