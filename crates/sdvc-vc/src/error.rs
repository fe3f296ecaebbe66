//! # Protocol Error Types
//!
//! Errors are reserved for requests the engine refuses to act on. A
//! credential that fails verification is not an error; it is a report with
//! `valid: false`.

use sdvc_core::{CanonicalizationError, CoreError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VcError {
    /// A precondition on the caller's input was violated.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The signer failed, or controls the wrong verification method.
    #[error("signing failed: {0}")]
    Signing(String),

    /// A requested disclosure field is not a claim of the credential.
    #[error("field not found in credential subject: {field}")]
    FieldNotFound { field: String },

    /// The candidate artifact is not a JSON object.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error("canonicalization failed: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The credential store could not be read or written.
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<CoreError> for VcError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidInput(msg) | CoreError::Timestamp(msg) => Self::InvalidInput(msg),
            CoreError::Canonicalization(e) => Self::Canonicalization(e),
        }
    }
}
