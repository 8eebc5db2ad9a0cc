//! Cryptographic layer for quire.
//!
//! This crate provides the primitives that give revision chains their
//! integrity guarantees:
//!
//! - [`RecordHasher`]: domain-separated BLAKE3 hashing used to derive
//!   content identifiers from encoded revision bytes.
//! - [`SigningKey`] / [`VerifyingKey`] / [`Signature`]: Ed25519 wrappers
//!   that bind revisions to their authors.
//! - [`RevisionCrypto`]: the seam through which the storage layer derives
//!   identifiers and validates that a candidate revision is a well-formed
//!   successor of the current head. [`ChainCrypto`] is the production
//!   implementation.

pub mod hasher;
pub mod signer;
pub mod successor;

pub use hasher::RecordHasher;
pub use signer::{Signature, SigningKey, VerifyingKey};
pub use successor::{ChainCrypto, RevisionCrypto, SuccessorError};
