use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TypeError;

/// Opaque identifier for a revision history.
///
/// The nil value, [`BranchId::MERGED`], is the reserved sentinel for the
/// single canonical merged mainline; every other value names an unmerged
/// branch. Unmerged branch identifiers are minted at random and are usually
/// short-lived. The 32-character hex form is the branch's on-disk journal
/// directory name.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BranchId(Uuid);

impl BranchId {
    /// The reserved sentinel for the merged mainline.
    pub const MERGED: Self = Self(Uuid::nil());

    /// Mint a fresh random identifier for an unmerged branch.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns `true` if this is the merged mainline sentinel.
    pub fn is_merged(&self) -> bool {
        self.0.is_nil()
    }

    /// Hex form without separators (32 characters); the journal directory name.
    pub fn to_hex(&self) -> String {
        self.0.simple().to_string()
    }

    /// Parse from the hex form.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let uuid = Uuid::try_parse(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        Ok(Self(uuid))
    }
}

impl fmt::Debug for BranchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_merged() {
            write!(f, "BranchId(merged)")
        } else {
            write!(f, "BranchId({})", &self.to_hex()[..8])
        }
    }
}

impl fmt::Display for BranchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Whether a revision belongs to the merged mainline or an unmerged branch.
///
/// The status is carried explicitly in every record and must agree with the
/// record's branch identifier; the storage coordinator enforces the
/// agreement rather than assuming it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MergedStatus {
    /// Part of the canonical merged history.
    Merged,
    /// Part of a speculative unmerged branch.
    Unmerged,
}

impl MergedStatus {
    /// The status a record on the given branch must carry.
    pub fn for_branch(branch: &BranchId) -> Self {
        if branch.is_merged() {
            Self::Merged
        } else {
            Self::Unmerged
        }
    }

    /// Returns `true` if this status agrees with the given branch identifier.
    pub fn matches_branch(&self, branch: &BranchId) -> bool {
        *self == Self::for_branch(branch)
    }
}

impl fmt::Display for MergedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Merged => write!(f, "merged"),
            Self::Unmerged => write!(f, "unmerged"),
        }
    }
}
