use quire_types::{
    CodecError, Revision, RevisionCodec, RevisionId, RevisionRecord, SignatureInfo,
    SignedRevision, UserId,
};

use crate::hasher::RecordHasher;
use crate::signer::{Signature, SigningKey, VerifyingKey};

/// Identifier derivation and successor validation for signed revisions.
///
/// The storage layer reaches cryptography only through this trait, so tests
/// can substitute a permissive implementation without touching real keys.
pub trait RevisionCrypto: Send + Sync {
    /// Derive the content identifier of a signed revision: the
    /// domain-separated hash of exactly the bytes the store persists.
    fn derive_identifier(&self, signed: &SignedRevision) -> Result<RevisionId, CodecError>;

    /// Check that `candidate` is a well-formed successor of `head`.
    fn validate_successor(
        &self,
        head: &SignedRevision,
        candidate: &SignedRevision,
    ) -> Result<(), SuccessorError>;
}

/// Production [`RevisionCrypto`] backed by a codec and Ed25519.
///
/// `validate_successor` checks, in order:
/// 1. the candidate's ordinal is exactly one past the head's,
/// 2. the candidate's predecessor link names the head's identifier,
/// 3. the candidate's author matches its verifying key,
/// 4. the Ed25519 signature covers the candidate's encoded record.
///
/// Branch and merge status are not compared: the first revision of a
/// conflict branch is validated against a mainline head and legitimately
/// differs from it on both.
pub struct ChainCrypto<C> {
    codec: C,
}

impl<C: RevisionCodec> ChainCrypto<C> {
    pub fn new(codec: C) -> Self {
        Self { codec }
    }

    /// Sign a record, producing the signed revision the storage layer accepts.
    ///
    /// The signature covers the encoded record bytes. The author field is
    /// taken as given, so a record signed with a key that does not match its
    /// author will fail [`RevisionCrypto::validate_successor`] later.
    pub fn sign(
        &self,
        record: RevisionRecord,
        key: &SigningKey,
    ) -> Result<SignedRevision, CodecError> {
        let payload = self.codec.encode_record(&record)?;
        let signature = key.sign(&payload);
        let sig = SignatureInfo {
            signature: signature.to_bytes().to_vec(),
            verifying_key: key.verifying_key().as_bytes(),
        };
        Ok(SignedRevision::new(record, sig))
    }
}

impl<C: RevisionCodec> RevisionCrypto for ChainCrypto<C> {
    fn derive_identifier(&self, signed: &SignedRevision) -> Result<RevisionId, CodecError> {
        let bytes = self.codec.encode(signed)?;
        Ok(RecordHasher::REVISION.hash(&bytes))
    }

    fn validate_successor(
        &self,
        head: &SignedRevision,
        candidate: &SignedRevision,
    ) -> Result<(), SuccessorError> {
        let revision = candidate.record.revision;
        if revision != head.record.revision.next() {
            return Err(SuccessorError::RevisionGap {
                head: head.record.revision,
                actual: revision,
            });
        }

        let head_id = self.derive_identifier(head)?;
        if candidate.record.predecessor != Some(head_id) {
            return Err(SuccessorError::PredecessorMismatch {
                head: head_id,
                linked: candidate.record.predecessor,
            });
        }

        let key = VerifyingKey::from_bytes(candidate.sig.verifying_key)
            .map_err(|_| SuccessorError::MalformedKey { revision })?;
        if key.to_user_id() != candidate.record.author {
            return Err(SuccessorError::AuthorMismatch {
                author: candidate.record.author,
                revision,
            });
        }

        let signature = Signature::from_slice(&candidate.sig.signature)
            .map_err(|_| SuccessorError::MalformedSignature { revision })?;
        let payload = self.codec.encode_record(&candidate.record)?;
        key.verify(&payload, &signature)
            .map_err(|_| SuccessorError::BadSignature { revision })?;
        Ok(())
    }
}

/// Reasons a candidate revision is not a valid successor of the head.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SuccessorError {
    #[error("revision {actual} does not follow head revision {head}")]
    RevisionGap { head: Revision, actual: Revision },

    #[error("predecessor link does not name head {head}")]
    PredecessorMismatch {
        head: RevisionId,
        linked: Option<RevisionId>,
    },

    #[error("author {author} of revision {revision} does not match its signing key")]
    AuthorMismatch { author: UserId, revision: Revision },

    #[error("malformed verifying key on revision {revision}")]
    MalformedKey { revision: Revision },

    #[error("malformed signature bytes on revision {revision}")]
    MalformedSignature { revision: Revision },

    #[error("bad signature on revision {revision}")]
    BadSignature { revision: Revision },

    #[error(transparent)]
    Codec(#[from] CodecError),
}

#[cfg(test)]
mod tests {
    use quire_types::{BincodeCodec, BranchId};

    use super::*;

    fn crypto() -> ChainCrypto<BincodeCodec> {
        ChainCrypto::new(BincodeCodec)
    }

    fn signed(
        ordinal: u64,
        branch: BranchId,
        predecessor: Option<RevisionId>,
        key: &SigningKey,
    ) -> SignedRevision {
        let mut record = RevisionRecord::new(Revision::new(ordinal), branch, key.user_id());
        record.predecessor = predecessor;
        record.body = format!("rev-{ordinal}").into_bytes();
        crypto().sign(record, key).unwrap()
    }

    fn head_and_id(key: &SigningKey) -> (SignedRevision, RevisionId) {
        let head = signed(1, BranchId::MERGED, None, key);
        let id = crypto().derive_identifier(&head).unwrap();
        (head, id)
    }

    #[test]
    fn valid_successor_accepted() {
        let key = SigningKey::generate();
        let (head, head_id) = head_and_id(&key);
        let candidate = signed(2, BranchId::MERGED, Some(head_id), &key);
        assert!(crypto().validate_successor(&head, &candidate).is_ok());
    }

    #[test]
    fn revision_gap_rejected() {
        let key = SigningKey::generate();
        let (head, head_id) = head_and_id(&key);
        let candidate = signed(3, BranchId::MERGED, Some(head_id), &key);
        assert_eq!(
            crypto().validate_successor(&head, &candidate),
            Err(SuccessorError::RevisionGap {
                head: Revision::new(1),
                actual: Revision::new(3),
            })
        );
    }

    #[test]
    fn repeated_revision_rejected() {
        let key = SigningKey::generate();
        let (head, head_id) = head_and_id(&key);
        let candidate = signed(1, BranchId::MERGED, Some(head_id), &key);
        assert!(matches!(
            crypto().validate_successor(&head, &candidate),
            Err(SuccessorError::RevisionGap { .. })
        ));
    }

    #[test]
    fn wrong_predecessor_link_rejected() {
        let key = SigningKey::generate();
        let (head, _) = head_and_id(&key);
        let wrong = RevisionId::from_hash([0x55; 32]);
        let candidate = signed(2, BranchId::MERGED, Some(wrong), &key);
        assert!(matches!(
            crypto().validate_successor(&head, &candidate),
            Err(SuccessorError::PredecessorMismatch {
                linked: Some(linked),
                ..
            }) if linked == wrong
        ));
    }

    #[test]
    fn missing_predecessor_link_rejected() {
        let key = SigningKey::generate();
        let (head, _) = head_and_id(&key);
        let candidate = signed(2, BranchId::MERGED, None, &key);
        assert!(matches!(
            crypto().validate_successor(&head, &candidate),
            Err(SuccessorError::PredecessorMismatch { linked: None, .. })
        ));
    }

    #[test]
    fn tampered_record_rejected() {
        let key = SigningKey::generate();
        let (head, head_id) = head_and_id(&key);
        let mut candidate = signed(2, BranchId::MERGED, Some(head_id), &key);
        candidate.record.body = b"tampered".to_vec();
        assert_eq!(
            crypto().validate_successor(&head, &candidate),
            Err(SuccessorError::BadSignature {
                revision: Revision::new(2),
            })
        );
    }

    #[test]
    fn author_not_matching_key_rejected() {
        let key = SigningKey::generate();
        let (head, head_id) = head_and_id(&key);
        let impostor = UserId::from_raw([9; 32]);
        let mut record = RevisionRecord::new(Revision::new(2), BranchId::MERGED, impostor);
        record.predecessor = Some(head_id);
        let candidate = crypto().sign(record, &key).unwrap();
        assert!(matches!(
            crypto().validate_successor(&head, &candidate),
            Err(SuccessorError::AuthorMismatch { author, .. }) if author == impostor
        ));
    }

    #[test]
    fn truncated_signature_bytes_rejected() {
        let key = SigningKey::generate();
        let (head, head_id) = head_and_id(&key);
        let mut candidate = signed(2, BranchId::MERGED, Some(head_id), &key);
        candidate.sig.signature.truncate(5);
        assert_eq!(
            crypto().validate_successor(&head, &candidate),
            Err(SuccessorError::MalformedSignature {
                revision: Revision::new(2),
            })
        );
    }

    #[test]
    fn conflict_branch_successor_of_mainline_head_accepted() {
        let key = SigningKey::generate();
        let (head, head_id) = head_and_id(&key);
        let candidate = signed(2, BranchId::random(), Some(head_id), &key);
        assert!(crypto().validate_successor(&head, &candidate).is_ok());
    }

    #[test]
    fn identifier_is_stable_across_decode() {
        let key = SigningKey::generate();
        let (head, head_id) = head_and_id(&key);
        let bytes = BincodeCodec.encode(&head).unwrap();
        let decoded = BincodeCodec.decode(&bytes).unwrap();
        assert_eq!(crypto().derive_identifier(&decoded).unwrap(), head_id);
    }
}
