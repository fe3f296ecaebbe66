//! # Credential Persistence
//!
//! A holder's wallet is the list of credentials issued to them. Stores are
//! scoped by holder DID: [`FileCredentialStore`] keeps one JSON array per
//! holder in `credentials_<holder-slug>.json`, the layout browser wallets
//! used for their local-storage keys.
//!
//! Removing a credential is how a holder revokes it from their wallet.
//! Stored credentials are immutable; storing a different credential under a
//! known id is refused.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::credential::Credential;
use crate::error::VcError;
use crate::resolve::CredentialResolver;

/// Holder-scoped credential storage.
pub trait CredentialStore: Send + Sync {
    /// Store a credential under its holder. Storing the identical
    /// credential twice is a no-op.
    fn put(&self, credential: &Credential) -> Result<(), VcError>;

    fn get(&self, id: &str) -> Result<Option<Credential>, VcError>;

    /// All credentials whose subject is `holder`, oldest first.
    fn list_for_holder(&self, holder: &str) -> Result<Vec<Credential>, VcError>;

    /// Remove a credential. Returns `false` if it was not stored.
    fn remove(&self, id: &str) -> Result<bool, VcError>;
}

fn sort_oldest_first(credentials: &mut [Credential]) {
    credentials.sort_by(|a, b| {
        a.issuance_date
            .cmp(&b.issuance_date)
            .then_with(|| a.id.cmp(&b.id))
    });
}

fn conflict(id: &str) -> VcError {
    VcError::InvalidInput(format!(
        "credential {id} is already stored with different content"
    ))
}

// ─── InMemoryCredentialStore ────────────────────────────────────────────

/// In-memory store. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCredentialStore {
    credentials: Arc<RwLock<HashMap<String, Credential>>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.credentials.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.credentials.read().is_empty()
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn put(&self, credential: &Credential) -> Result<(), VcError> {
        let mut credentials = self.credentials.write();
        match credentials.get(&credential.id) {
            Some(existing) if existing == credential => Ok(()),
            Some(_) => Err(conflict(&credential.id)),
            None => {
                credentials.insert(credential.id.clone(), credential.clone());
                Ok(())
            }
        }
    }

    fn get(&self, id: &str) -> Result<Option<Credential>, VcError> {
        Ok(self.credentials.read().get(id).cloned())
    }

    fn list_for_holder(&self, holder: &str) -> Result<Vec<Credential>, VcError> {
        let mut out: Vec<Credential> = self
            .credentials
            .read()
            .values()
            .filter(|c| c.holder() == holder)
            .cloned()
            .collect();
        sort_oldest_first(&mut out);
        Ok(out)
    }

    fn remove(&self, id: &str) -> Result<bool, VcError> {
        Ok(self.credentials.write().remove(id).is_some())
    }
}

impl CredentialResolver for InMemoryCredentialStore {
    fn resolve_credential(&self, id: &str) -> Result<Option<Credential>, VcError> {
        Ok(self.credentials.read().get(id).cloned())
    }
}

// ─── FileCredentialStore ────────────────────────────────────────────────

const FILE_PREFIX: &str = "credentials_";
const FILE_SUFFIX: &str = ".json";

/// One JSON array per holder under a directory.
///
/// Writes go to a temporary file that is renamed over the target, so a
/// crash never leaves a truncated wallet. A process-local lock serializes
/// writers; separate processes sharing a directory are not coordinated.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    dir: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl FileCredentialStore {
    /// The directory is created on the first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the wallet file for `holder`.
    pub fn wallet_path(&self, holder: &str) -> PathBuf {
        self.dir
            .join(format!("{FILE_PREFIX}{}{FILE_SUFFIX}", holder_slug(holder)))
    }

    fn read_wallet(path: &Path) -> Result<Vec<Credential>, VcError> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(VcError::Storage(format!(
                    "failed to read {}: {e}",
                    path.display()
                )))
            }
        };
        serde_json::from_slice(&bytes).map_err(|e| {
            VcError::Storage(format!("{} is not a credential list: {e}", path.display()))
        })
    }

    fn write_wallet(&self, path: &Path, credentials: &[Credential]) -> Result<(), VcError> {
        let storage = |e: std::io::Error| {
            VcError::Storage(format!("failed to write {}: {e}", path.display()))
        };
        fs::create_dir_all(&self.dir).map_err(storage)?;
        let json = serde_json::to_vec_pretty(credentials)?;
        let tmp = path.with_extension("json.tmp");
        let mut file = fs::File::create(&tmp).map_err(storage)?;
        file.write_all(&json).map_err(storage)?;
        file.sync_all().map_err(storage)?;
        fs::rename(&tmp, path).map_err(storage)
    }

    fn wallet_files(&self) -> Result<Vec<PathBuf>, VcError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(VcError::Storage(format!(
                    "failed to list {}: {e}",
                    self.dir.display()
                )))
            }
        };
        let mut files = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|e| VcError::Storage(format!("failed to list {}: {e}", self.dir.display())))?
                .path();
            let is_wallet = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(FILE_PREFIX) && n.ends_with(FILE_SUFFIX));
            if is_wallet {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

impl CredentialStore for FileCredentialStore {
    fn put(&self, credential: &Credential) -> Result<(), VcError> {
        let _guard = self.write_lock.lock();
        let path = self.wallet_path(credential.holder());
        let mut wallet = Self::read_wallet(&path)?;
        match wallet.iter().find(|c| c.id == credential.id) {
            Some(existing) if existing == credential => return Ok(()),
            Some(_) => return Err(conflict(&credential.id)),
            None => {}
        }
        wallet.push(credential.clone());
        self.write_wallet(&path, &wallet)?;
        tracing::debug!(id = %credential.id, path = %path.display(), "stored credential");
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<Credential>, VcError> {
        for path in self.wallet_files()? {
            if let Some(found) = Self::read_wallet(&path)?.into_iter().find(|c| c.id == id) {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }

    fn list_for_holder(&self, holder: &str) -> Result<Vec<Credential>, VcError> {
        let mut wallet: Vec<Credential> = Self::read_wallet(&self.wallet_path(holder))?
            .into_iter()
            .filter(|c| c.holder() == holder)
            .collect();
        sort_oldest_first(&mut wallet);
        Ok(wallet)
    }

    fn remove(&self, id: &str) -> Result<bool, VcError> {
        let _guard = self.write_lock.lock();
        for path in self.wallet_files()? {
            let mut wallet = Self::read_wallet(&path)?;
            let before = wallet.len();
            wallet.retain(|c| c.id != id);
            if wallet.len() != before {
                self.write_wallet(&path, &wallet)?;
                tracing::debug!(id, path = %path.display(), "removed credential");
                return Ok(true);
            }
        }
        Ok(false)
    }
}

impl CredentialResolver for FileCredentialStore {
    fn resolve_credential(&self, id: &str) -> Result<Option<Credential>, VcError> {
        self.get(id)
    }
}

/// File-name-safe rendering of a holder DID.
fn holder_slug(holder: &str) -> String {
    holder
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}
