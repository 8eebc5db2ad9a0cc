//! Foundation types for quire, a per-folder metadata storage engine.
//!
//! This crate provides the identifiers and the signed revision record used
//! throughout the quire system. Every other quire crate depends on
//! `quire-types`.
//!
//! # Key Types
//!
//! - [`RevisionId`] — Content-addressed identifier of a stored revision
//!   (BLAKE3 hash of its encoded bytes)
//! - [`BranchId`] — Opaque branch identifier; the nil value is the reserved
//!   sentinel for the merged mainline
//! - [`Revision`] — Per-branch strictly increasing ordinal
//! - [`UserId`] — Requester identity derived from a signing key
//! - [`SignedRevision`] — The immutable unit of storage: a revision record
//!   plus its signature, annotated on read with an untrusted local timestamp
//! - [`RevisionCodec`] — The serialization seam, with [`BincodeCodec`] as
//!   the default implementation

pub mod branch;
pub mod codec;
pub mod error;
pub mod identity;
pub mod record;
pub mod revision;

pub use branch::{BranchId, MergedStatus};
pub use codec::{BincodeCodec, CodecError, RevisionCodec};
pub use error::TypeError;
pub use identity::UserId;
pub use record::{RevisionRecord, SignatureInfo, SignedRevision};
pub use revision::{Revision, RevisionId};
