use thiserror::Error;

use crate::record::{RevisionRecord, SignedRevision};

/// Serialization seam for revision payloads.
///
/// The object store and the crypto layer both consume this interface:
/// stored bytes are `encode` output, content identifiers are derived from
/// those bytes, and signatures cover `encode_record` output. The encoding
/// must be deterministic (the same value always yields the same bytes) or
/// content addressing falls apart.
pub trait RevisionCodec: Send + Sync {
    /// Encode a signed revision to its stored byte form.
    fn encode(&self, signed: &SignedRevision) -> Result<Vec<u8>, CodecError>;

    /// Decode a signed revision from its stored byte form.
    fn decode(&self, bytes: &[u8]) -> Result<SignedRevision, CodecError>;

    /// Encode the inner record alone; this is the byte string a signature
    /// covers.
    fn encode_record(&self, record: &RevisionRecord) -> Result<Vec<u8>, CodecError>;
}

/// Errors from encoding or decoding revision payloads.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("encode error: {0}")]
    Encode(String),

    #[error("decode error: {0}")]
    Decode(String),
}

/// Default bincode-backed codec.
///
/// Bincode is deterministic for these types (no maps, stable field order),
/// which makes it safe to hash its output for content addressing.
#[derive(Clone, Copy, Debug, Default)]
pub struct BincodeCodec;

impl RevisionCodec for BincodeCodec {
    fn encode(&self, signed: &SignedRevision) -> Result<Vec<u8>, CodecError> {
        bincode::serialize(signed).map_err(|e| CodecError::Encode(e.to_string()))
    }

    fn decode(&self, bytes: &[u8]) -> Result<SignedRevision, CodecError> {
        bincode::deserialize(bytes).map_err(|e| CodecError::Decode(e.to_string()))
    }

    fn encode_record(&self, record: &RevisionRecord) -> Result<Vec<u8>, CodecError> {
        bincode::serialize(record).map_err(|e| CodecError::Encode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::branch::BranchId;
    use crate::identity::UserId;
    use crate::record::SignatureInfo;
    use crate::revision::Revision;

    fn make_signed() -> SignedRevision {
        let record = RevisionRecord::new(
            Revision::new(3),
            BranchId::random(),
            UserId::from_raw([5; 32]),
        );
        SignedRevision::new(
            record,
            SignatureInfo {
                signature: vec![7u8; 64],
                verifying_key: [8u8; 32],
            },
        )
    }

    #[test]
    fn encode_decode_roundtrip() {
        let codec = BincodeCodec;
        let signed = make_signed();
        let bytes = codec.encode(&signed).unwrap();
        let decoded = codec.decode(&bytes).unwrap();
        assert_eq!(decoded.record, signed.record);
        assert_eq!(decoded.sig, signed.sig);
    }

    #[test]
    fn encoding_is_deterministic() {
        let codec = BincodeCodec;
        let signed = make_signed();
        assert_eq!(codec.encode(&signed).unwrap(), codec.encode(&signed).unwrap());
    }

    #[test]
    fn reencoding_a_decoded_value_is_stable() {
        let codec = BincodeCodec;
        let bytes = codec.encode(&make_signed()).unwrap();
        let decoded = codec.decode(&bytes).unwrap();
        assert_eq!(codec.encode(&decoded).unwrap(), bytes);
    }

    #[test]
    fn record_encoding_ignores_signature() {
        let codec = BincodeCodec;
        let signed = make_signed();
        let mut resigned = signed.clone();
        resigned.sig.signature = vec![9u8; 64];

        assert_eq!(
            codec.encode_record(&signed.record).unwrap(),
            codec.encode_record(&resigned.record).unwrap()
        );
        assert_ne!(codec.encode(&signed).unwrap(), codec.encode(&resigned).unwrap());
    }

    #[test]
    fn decode_rejects_garbage() {
        let codec = BincodeCodec;
        assert!(matches!(
            codec.decode(b"definitely not bincode"),
            Err(CodecError::Decode(_))
        ));
    }
}
