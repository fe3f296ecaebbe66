//! # Error Types
//!
//! Errors raised by the foundational layer. Higher crates wrap these in
//! their own `thiserror` enums via `#[from]` or explicit `From` impls.

use thiserror::Error;

/// Top-level error type for `sdvc-core`.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A construction argument was empty or malformed.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Canonicalization failed.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// A timestamp could not be parsed or represented.
    #[error("invalid timestamp: {0}")]
    Timestamp(String),
}

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values have no deterministic JCS rendering across
    /// implementations; claims must be strings or integers.
    #[error("float values are not permitted in canonical representations: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}
