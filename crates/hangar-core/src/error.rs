//! Error taxonomy shared by the persistence and API layers.
//!
//! Every failure a service operation can produce is translated into one of
//! these kinds before it crosses the API boundary; the server crate maps
//! each kind to an HTTP status code.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A required field is missing or empty after trimming.
    #[error("{0}")]
    Validation(String),

    /// A foreign-key field does not resolve under the caller's ownership.
    #[error("{0}")]
    InvalidReference(String),

    /// A uniqueness constraint was violated.
    #[error("{0}")]
    Duplicate(String),

    /// The row is absent or owned by a different user; the two cases are
    /// indistinguishable to the caller.
    #[error("{0}")]
    NotFound(String),

    /// No valid session identity is attached to the request, or presented
    /// credentials did not verify.
    #[error("{0}")]
    Unauthenticated(String),

    /// A delete is blocked by rows that still reference the target.
    #[error("{0}")]
    InUse(String),

    /// The bulk import transaction was rolled back.
    #[error("import failed: {0}")]
    ImportFailed(String),

    /// Unexpected database or runtime failure. The message is logged
    /// server-side; callers receive a generic body.
    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;
