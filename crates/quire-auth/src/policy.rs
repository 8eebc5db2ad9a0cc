use quire_types::{RevisionRecord, SignedRevision, UserId};

use crate::error::AuthError;

/// Authorization predicates evaluated against the merged mainline head.
///
/// `head` is `None` for a folder with no mainline history yet; both
/// predicates allow in that case, so the folder's first revision can
/// establish its membership.
pub trait Authorizer: Send + Sync {
    /// Whether the user may read folder history.
    fn is_reader(&self, user: &UserId, head: Option<&SignedRevision>) -> Result<bool, AuthError>;

    /// Whether the user may land `candidate`: either as a listed writer, or
    /// as a reader submitting a valid rekey.
    fn is_writer_or_valid_rekey(
        &self,
        user: &UserId,
        head: Option<&SignedRevision>,
        candidate: &SignedRevision,
    ) -> Result<bool, AuthError>;
}

/// Access control read from the head revision's own membership lists.
///
/// Readers are the union of the reader and writer lists. A reader who is
/// not a writer may still land exactly one narrow kind of revision: a
/// *rekey*, which must be authored by that reader, leave the membership
/// lists and the body untouched, and strictly increase the key generation.
#[derive(Clone, Copy, Debug, Default)]
pub struct AclAuthorizer;

impl Authorizer for AclAuthorizer {
    fn is_reader(&self, user: &UserId, head: Option<&SignedRevision>) -> Result<bool, AuthError> {
        Ok(match head {
            None => true,
            Some(head) => head.record.has_reader(user),
        })
    }

    fn is_writer_or_valid_rekey(
        &self,
        user: &UserId,
        head: Option<&SignedRevision>,
        candidate: &SignedRevision,
    ) -> Result<bool, AuthError> {
        let Some(head) = head else {
            return Ok(true);
        };
        if head.record.has_writer(user) {
            return Ok(true);
        }
        if !head.record.has_reader(user) {
            return Ok(false);
        }
        Ok(is_valid_rekey(user, &head.record, &candidate.record))
    }
}

fn is_valid_rekey(user: &UserId, head: &RevisionRecord, candidate: &RevisionRecord) -> bool {
    candidate.author == *user
        && candidate.writers == head.writers
        && candidate.readers == head.readers
        && candidate.body == head.body
        && candidate.key_generation > head.key_generation
}
