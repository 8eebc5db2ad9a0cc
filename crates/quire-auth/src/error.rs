/// Errors from authorization backends.
///
/// The built-in ACL policy never fails, but implementations backed by an
/// external membership service can.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AuthError {
    /// The policy backend could not answer the membership question.
    #[error("policy backend failure: {0}")]
    Backend(String),
}
