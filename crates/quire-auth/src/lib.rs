//! Authorization predicates for folder storage.
//!
//! Access is always judged against the head of the merged mainline,
//! regardless of which branch a request touches. The [`Authorizer`] trait
//! is the seam the storage coordinator calls through; [`AclAuthorizer`] is
//! the default policy, reading the writer and reader lists carried by the
//! head revision itself.

pub mod error;
pub mod policy;

pub use error::AuthError;
pub use policy::{AclAuthorizer, Authorizer};
