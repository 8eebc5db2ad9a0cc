use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Content-addressed identifier for a stored revision.
///
/// A `RevisionId` is the BLAKE3 hash of a signed revision's encoded bytes.
/// Identical content always produces the same `RevisionId`, making stored
/// revisions deduplicatable and verifiable. The first four characters of the
/// hex form select the object store's splay directory.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RevisionId([u8; 32]);

impl RevisionId {
    /// Create a `RevisionId` from a pre-computed hash.
    pub const fn from_hash(hash: [u8; 32]) -> Self {
        Self(hash)
    }

    /// The raw 32-byte hash.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Hex-encoded string representation (64 characters).
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short hex representation (first 8 characters).
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }

    /// Parse from a hex string.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        if bytes.len() != 32 {
            return Err(TypeError::InvalidLength {
                expected: 32,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for RevisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RevisionId({})", self.short_hex())
    }
}

impl fmt::Display for RevisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl From<[u8; 32]> for RevisionId {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

/// Per-branch revision ordinal.
///
/// Revisions are strictly positive and strictly increasing within a branch;
/// [`Revision::FIRST`] is the ordinal of a folder's initial revision. The
/// value doubles as the journal entry filename in its zero-padded hex form.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Revision(u64);

impl Revision {
    /// The ordinal of the first revision in a folder's history.
    pub const FIRST: Self = Self(1);

    /// Create a revision from a raw ordinal.
    pub const fn new(ordinal: u64) -> Self {
        Self(ordinal)
    }

    /// The raw ordinal value.
    pub const fn value(&self) -> u64 {
        self.0
    }

    /// The next revision ordinal.
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    /// The previous revision ordinal, or `None` at or below [`Self::FIRST`].
    pub fn prev(&self) -> Option<Self> {
        if self.0 > Self::FIRST.0 {
            Some(Self(self.0 - 1))
        } else {
            None
        }
    }

    /// Zero-padded hex form used as the journal entry filename (16 chars).
    pub fn to_hex_name(&self) -> String {
        format!("{:016x}", self.0)
    }

    /// Parse from the hex filename form.
    pub fn from_hex_name(s: &str) -> Result<Self, TypeError> {
        let ordinal =
            u64::from_str_radix(s.trim(), 16).map_err(|e| TypeError::InvalidOrdinal(e.to_string()))?;
        Ok(Self(ordinal))
    }
}

impl fmt::Debug for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Revision({})", self.0)
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
