//! Content-addressed on-disk object store for signed revisions.
//!
//! Every stored object lives at a path derived from its own content: the
//! identifier is the domain-separated BLAKE3 hash of the encoded bytes, the
//! first four hex characters select a splay directory, and the remaining
//! characters name the file. Objects are immutable once written; identical
//! content deduplicates to a single file, and every read re-checks the
//! stored bytes against the identifier before decoding.

pub mod error;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use store::ObjectStore;
