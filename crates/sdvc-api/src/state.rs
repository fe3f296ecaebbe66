//! # Application State
//!
//! Shared state behind every handler:
//!
//! - the [`DidRegistry`] that resolves DIDs and their public keys;
//! - the custodial [`Keyring`] holding one signer per registered DID;
//! - the wallet: a holder-scoped [`CredentialStore`], in memory by default
//!   or on disk when `SDVC_WALLET_DIR` is set.
//!
//! All of it is `Clone` and shares the underlying data, so the router can
//! hand a copy to each request.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::RwLock;

use sdvc_crypto::Ed25519Signer;
use sdvc_vc::{
    CredentialResolver, CredentialStore, DidRegistry, FileCredentialStore,
    InMemoryCredentialStore,
};

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Thread-safe keyed map. Clones share the same data.
#[derive(Debug)]
pub struct Store<T: Clone + Send + Sync> {
    data: Arc<RwLock<HashMap<String, T>>>,
}

impl<T: Clone + Send + Sync> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
        }
    }
}

impl<T: Clone + Send + Sync> Default for Store<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + Sync> Store<T> {
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Insert a record, returning the previous value if the key existed.
    pub fn insert(&self, key: impl Into<String>, value: T) -> Option<T> {
        self.data.write().insert(key.into(), value)
    }

    pub fn get(&self, key: &str) -> Option<T> {
        self.data.read().get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.data.read().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }
}

/// Custodial signing keys, keyed by DID.
pub type Keyring = Store<Arc<Ed25519Signer>>;

// ---------------------------------------------------------------------------
// Wallet
// ---------------------------------------------------------------------------

/// A credential store the verifier can also resolve source credentials
/// from.
pub trait Wallet: CredentialStore {
    fn as_resolver(&self) -> &dyn CredentialResolver;
}

impl<T: CredentialStore + CredentialResolver> Wallet for T {
    fn as_resolver(&self) -> &dyn CredentialResolver {
        self
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Application configuration.
///
/// Custom `Debug` redacts the `auth_token`.
#[derive(Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Static bearer token. If `None`, authentication is disabled.
    pub auth_token: Option<String>,
    /// Directory for per-holder wallet files. In-memory when `None`.
    pub wallet_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Read `PORT`, `AUTH_TOKEN` and `SDVC_WALLET_DIR`.
    ///
    /// An unparsable `PORT` falls back to 8080 with a warning. Empty
    /// values count as unset.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let port = match std::env::var("PORT") {
            Ok(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "PORT is not a valid port number, using {}", defaults.port);
                defaults.port
            }),
            Err(_) => defaults.port,
        };
        let non_empty = |var: &str| std::env::var(var).ok().filter(|v| !v.trim().is_empty());
        Self {
            port,
            auth_token: non_empty("AUTH_TOKEN"),
            wallet_dir: non_empty("SDVC_WALLET_DIR").map(PathBuf::from),
        }
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field(
                "auth_token",
                &self.auth_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("wallet_dir", &self.wallet_dir)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            auth_token: None,
            wallet_dir: None,
        }
    }
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub registry: DidRegistry,
    pub keyring: Keyring,
    pub wallet: Arc<dyn Wallet>,
}

impl AppState {
    /// In-memory state with authentication disabled.
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let wallet: Arc<dyn Wallet> = match &config.wallet_dir {
            Some(dir) => {
                tracing::info!(dir = %dir.display(), "using file-backed wallet");
                Arc::new(FileCredentialStore::new(dir.clone()))
            }
            None => Arc::new(InMemoryCredentialStore::new()),
        };
        Self {
            config,
            registry: DidRegistry::new(),
            keyring: Keyring::new(),
            wallet,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
