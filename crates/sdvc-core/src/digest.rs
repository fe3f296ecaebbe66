//! # Content Digests
//!
//! `ContentDigest` names a blob in a content-addressed store and is what a
//! credential records in `metadata.contentHash`. It renders as
//! `sha256:<64 hex>` and parses back from the same form.
//!
//! Two construction paths exist on purpose:
//!
//! - [`sha256_digest()`] over `&CanonicalBytes`, for JSON documents whose
//!   digest must be independent of key order and whitespace.
//! - [`sha256_raw()`] over arbitrary bytes, for opaque attachments (scans,
//!   PDFs) that are stored exactly as uploaded.

use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::canonical::CanonicalBytes;
use crate::error::CoreError;

/// The hash algorithm that produced a content digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DigestAlgorithm {
    /// SHA-256.
    Sha256,
}

impl DigestAlgorithm {
    /// Returns the algorithm tag used in the textual form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
        }
    }
}

impl std::fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A 32-byte digest with its algorithm tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentDigest {
    /// The hash algorithm that produced this digest.
    pub algorithm: DigestAlgorithm,
    /// The raw digest value.
    pub bytes: [u8; 32],
}

impl ContentDigest {
    pub fn new(algorithm: DigestAlgorithm, bytes: [u8; 32]) -> Self {
        Self { algorithm, bytes }
    }

    /// Lowercase hex of the digest bytes, without the algorithm tag.
    pub fn to_hex(&self) -> String {
        self.bytes.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Parse `sha256:<hex>` or a bare 64-character hex string.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        let s = s.trim();
        let hex = match s.split_once(':') {
            Some(("sha256", rest)) => rest,
            Some((tag, _)) => {
                return Err(CoreError::InvalidInput(format!(
                    "unsupported digest algorithm: {tag}"
                )))
            }
            None => s,
        };
        if hex.len() != 64 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(CoreError::InvalidInput(format!(
                "digest must be 64 hex chars, got {:?}",
                hex
            )));
        }
        let mut bytes = [0u8; 32];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16)
                .map_err(|e| CoreError::InvalidInput(format!("invalid digest hex: {e}")))?;
        }
        Ok(Self::new(DigestAlgorithm::Sha256, bytes))
    }
}

impl std::fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.to_hex())
    }
}

impl FromStr for ContentDigest {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for ContentDigest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ContentDigest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// SHA-256 over canonical JSON bytes.
pub fn sha256_digest(data: &CanonicalBytes) -> ContentDigest {
    sha256_raw(data.as_bytes())
}

/// SHA-256 over an opaque blob.
pub fn sha256_raw(data: &[u8]) -> ContentDigest {
    let hash = Sha256::digest(data);
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&hash);
    ContentDigest::new(DigestAlgorithm::Sha256, bytes)
}
