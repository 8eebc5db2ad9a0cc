//! Per-branch append-only revision journal.
//!
//! A journal maps a gapless run of revision ordinals to content identifiers
//! for one branch. Each entry is a file named after its revision; two marker
//! files, `EARLIEST` and `LATEST`, persist the boundaries of the retained
//! window independently of the entries. Appends are continuity-checked, the
//! earliest pointer only ever moves forward, and entry files are never
//! deleted.

pub mod error;
pub mod journal;

pub use error::{JournalError, JournalResult};
pub use journal::BranchJournal;
