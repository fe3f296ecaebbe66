//! # Content-Addressed Attachment Storage
//!
//! Attachments (document scans, PDFs) are stored by SHA-256 of their raw
//! bytes. A credential only records the digest in `metadata.contentHash`;
//! the blob itself lives in a [`ContentStore`].
//!
//! ## Security Invariant
//!
//! Every fetch recomputes the digest of the stored bytes and compares it to
//! the requested one in constant time. A blob that was altered on disk is
//! reported as an error, never returned.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use sdvc_core::{sha256_raw, ContentDigest};
use subtle::ConstantTimeEq;

use crate::error::CryptoError;

/// Store and fetch blobs by content digest.
pub trait ContentStore: Send + Sync {
    /// Store `bytes`, returning their digest. Storing the same bytes twice
    /// is a no-op.
    fn store(&self, bytes: &[u8]) -> Result<ContentDigest, CryptoError>;

    /// Fetch the blob for `digest`, or `None` if it was never stored.
    fn fetch(&self, digest: &ContentDigest) -> Result<Option<Vec<u8>>, CryptoError>;
}

/// Filesystem store laid out as `<base>/<hex digest>`.
#[derive(Debug, Clone)]
pub struct FsContentStore {
    base_dir: PathBuf,
}

impl FsContentStore {
    /// The directory is created on the first `store` call.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn path_for(&self, digest: &ContentDigest) -> PathBuf {
        self.base_dir.join(digest.to_hex())
    }
}

impl ContentStore for FsContentStore {
    fn store(&self, bytes: &[u8]) -> Result<ContentDigest, CryptoError> {
        let digest = sha256_raw(bytes);
        fs::create_dir_all(&self.base_dir)?;
        let path = self.path_for(&digest);
        // create_new makes concurrent writers of the same blob race safely.
        match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
        {
            Ok(mut f) => f.write_all(bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {}
            Err(e) => return Err(e.into()),
        }
        Ok(digest)
    }

    fn fetch(&self, digest: &ContentDigest) -> Result<Option<Vec<u8>>, CryptoError> {
        let path = self.path_for(digest);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let recomputed = sha256_raw(&bytes);
        if !bool::from(recomputed.bytes[..].ct_eq(&digest.bytes[..])) {
            tracing::warn!(path = %path.display(), "content store integrity violation");
            return Err(CryptoError::ContentStore(format!(
                "integrity violation: blob at {} has digest {} but was stored as {}",
                path.display(),
                recomputed,
                digest
            )));
        }
        Ok(Some(bytes))
    }
}

/// In-memory store for tests and ephemeral deployments.
#[derive(Debug, Clone, Default)]
pub struct MemoryContentStore {
    blobs: Arc<RwLock<HashMap<[u8; 32], Vec<u8>>>>,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.blobs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.read().is_empty()
    }
}

impl ContentStore for MemoryContentStore {
    fn store(&self, bytes: &[u8]) -> Result<ContentDigest, CryptoError> {
        let digest = sha256_raw(bytes);
        self.blobs
            .write()
            .entry(digest.bytes)
            .or_insert_with(|| bytes.to_vec());
        Ok(digest)
    }

    fn fetch(&self, digest: &ContentDigest) -> Result<Option<Vec<u8>>, CryptoError> {
        Ok(self.blobs.read().get(&digest.bytes).cloned())
    }
}
