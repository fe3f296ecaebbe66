//! # Resolution
//!
//! The verifier needs two lookups it cannot perform itself:
//!
//! - [`KeyResolver`]: verification method → public key. When it yields
//!   nothing, signature checks degrade to presence checks and the report is
//!   `partiallyVerified`.
//! - [`CredentialResolver`]: credential id → source credential, for
//!   checking a presentation against what was actually issued. A lookup
//!   that fails is an error, not a missing credential.
//!
//! Both are implemented for closures, so tests and one-off callers need no
//! wrapper types.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use sdvc_core::{split_method_reference, DidDocument, KeyType};
use sdvc_crypto::Ed25519PublicKey;

use crate::credential::Credential;
use crate::error::VcError;

/// Looks up the public key behind a verification method.
pub trait KeyResolver {
    fn resolve_key(&self, verification_method: &str) -> Option<Ed25519PublicKey>;
}

impl<F> KeyResolver for F
where
    F: Fn(&str) -> Option<Ed25519PublicKey>,
{
    fn resolve_key(&self, verification_method: &str) -> Option<Ed25519PublicKey> {
        self(verification_method)
    }
}

/// A resolver that knows no keys. Every signature check degrades.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoKeyMaterial;

impl KeyResolver for NoKeyMaterial {
    fn resolve_key(&self, _verification_method: &str) -> Option<Ed25519PublicKey> {
        None
    }
}

/// Looks up a credential by id.
pub trait CredentialResolver {
    /// `Ok(None)` when no credential has this id; `Err` when the backing
    /// storage could not be read.
    fn resolve_credential(&self, id: &str) -> Result<Option<Credential>, VcError>;
}

impl<F> CredentialResolver for F
where
    F: Fn(&str) -> Result<Option<Credential>, VcError>,
{
    fn resolve_credential(&self, id: &str) -> Result<Option<Credential>, VcError> {
        self(id)
    }
}

// ---------------------------------------------------------------------------
// DidRegistry
// ---------------------------------------------------------------------------

/// Thread-safe in-memory map from DID to document.
///
/// Documents are immutable once registered: registering a different
/// document under a known DID is refused, registering the same document
/// again is a no-op. Clones share the underlying map.
#[derive(Debug, Clone, Default)]
pub struct DidRegistry {
    documents: Arc<RwLock<HashMap<String, DidDocument>>>,
}

impl DidRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a validated document.
    ///
    /// Returns `true` if the document was added, `false` if the identical
    /// document was already present.
    pub fn register(&self, document: DidDocument) -> Result<bool, VcError> {
        document.validate()?;
        let mut documents = self.documents.write();
        match documents.get(document.id.as_str()) {
            Some(existing) if *existing == document => Ok(false),
            Some(_) => Err(VcError::InvalidInput(format!(
                "{} is already registered with a different document",
                document.id
            ))),
            None => {
                tracing::debug!(did = %document.id, "registered DID document");
                documents.insert(document.id.to_string(), document);
                Ok(true)
            }
        }
    }

    pub fn resolve(&self, did: &str) -> Option<DidDocument> {
        self.documents.read().get(did).cloned()
    }

    /// Find the document whose account address is `address`
    /// (case-insensitive).
    pub fn find_by_controller(&self, address: &str) -> Option<DidDocument> {
        let address = address.trim().to_lowercase();
        if address.is_empty() {
            return None;
        }
        let prefix = format!("{address}@");
        self.documents
            .read()
            .values()
            .find(|doc| {
                doc.verification_method.iter().any(|m| {
                    m.blockchain_account_id
                        .as_deref()
                        .is_some_and(|acct| acct.to_lowercase().starts_with(&prefix))
                })
            })
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }
}

impl KeyResolver for DidRegistry {
    fn resolve_key(&self, verification_method: &str) -> Option<Ed25519PublicKey> {
        let (did, _) = split_method_reference(verification_method)?;
        let documents = self.documents.read();
        let method = documents.get(did)?.method(verification_method)?;
        if method.key_type != KeyType::Ed25519VerificationKey2020 {
            return None;
        }
        let hex = method.public_key_hex.as_deref()?;
        match Ed25519PublicKey::from_hex(hex) {
            Ok(key) => Some(key),
            Err(e) => {
                tracing::warn!(method = verification_method, error = %e, "unusable publicKeyHex");
                None
            }
        }
    }
}
