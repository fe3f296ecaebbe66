//! # Cryptographic Error Types

use thiserror::Error;

/// Errors from signing, key handling and content storage.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// A signature did not verify, or was not decodable as one.
    #[error("signature verification failed: {0}")]
    VerificationFailed(String),

    /// Key material was missing or malformed.
    #[error("key error: {0}")]
    KeyError(String),

    /// The signer could not produce a proof.
    #[error("signing failed: {0}")]
    Signing(String),

    /// A content store operation failed, including integrity violations.
    #[error("content store error: {0}")]
    ContentStore(String),

    /// Filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
