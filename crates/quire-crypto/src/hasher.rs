use quire_types::RevisionId;

/// Domain-separated BLAKE3 hasher for revision content.
///
/// The hasher carries a domain tag that is prepended to every hash
/// computation, so bytes hashed as one kind of value can never collide
/// with the same bytes hashed as another.
pub struct RecordHasher {
    domain: &'static str,
}

impl RecordHasher {
    /// Hasher for encoded signed revisions. The identifier of a revision
    /// is exactly this hash over the bytes the store persists.
    pub const REVISION: Self = Self {
        domain: "quire-revision-v1",
    };

    /// Create a hasher with a custom domain tag.
    pub const fn new(domain: &'static str) -> Self {
        Self { domain }
    }

    /// Hash raw bytes with domain separation.
    pub fn hash(&self, data: &[u8]) -> RevisionId {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        hasher.update(data);
        RevisionId::from_hash(*hasher.finalize().as_bytes())
    }

    /// Verify that data hashes to the expected identifier.
    pub fn verify(&self, data: &[u8], expected: &RevisionId) -> bool {
        self.hash(data) == *expected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic() {
        let data = b"revision bytes";
        let id1 = RecordHasher::REVISION.hash(data);
        let id2 = RecordHasher::REVISION.hash(data);
        assert_eq!(id1, id2);
    }

    #[test]
    fn different_domains_produce_different_hashes() {
        let data = b"same content";
        let custom = RecordHasher::new("quire-test-v1");
        assert_ne!(RecordHasher::REVISION.hash(data), custom.hash(data));
    }

    #[test]
    fn verify_correct_data() {
        let data = b"stored bytes";
        let id = RecordHasher::REVISION.hash(data);
        assert!(RecordHasher::REVISION.verify(data, &id));
    }

    #[test]
    fn verify_incorrect_data() {
        let id = RecordHasher::REVISION.hash(b"original");
        assert!(!RecordHasher::REVISION.verify(b"tampered", &id));
    }
}
