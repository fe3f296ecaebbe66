//! # Identifier Model: DIDs and DID Documents
//!
//! A DID names a controller; its document lists the verification methods
//! that may act for it. Credentials reference a method of the issuer's
//! document (`<issuer>#controller`) and presentations a method of the
//! holder's.
//!
//! ## Derivation
//!
//! [`derive_did()`] builds `did:ethr:<chain>:<address>` from a wallet's
//! account address and chain reference. The address is normalised to
//! lowercase, so the same account always yields the same identifier.
//!
//! ## Invariant
//!
//! Every entry of `authentication` and `assertionMethod` must resolve to an
//! entry of `verificationMethod`. [`build_document()`] produces documents
//! that satisfy it and [`DidDocument::validate()`] checks documents received
//! from elsewhere. Key resolution in the verifier relies on it.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// JSON-LD context of a DID document.
pub const DID_CONTEXT: &str = "https://www.w3.org/ns/did/v1";

/// Fragment of the canonical verification method of a derived DID.
pub const CONTROLLER_FRAGMENT: &str = "controller";

/// Method name used by [`derive_did()`].
const ETHR_METHOD: &str = "ethr";

// ---------------------------------------------------------------------------
// Did
// ---------------------------------------------------------------------------

/// A validated decentralized identifier, `did:<method>:<method-specific-id>`.
///
/// The method is lowercase alphanumeric. The method-specific id is
/// non-empty and drawn from `[A-Za-z0-9._:%-]`. Fragments (`#...`) are not
/// part of a DID; see [`split_method_reference()`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Did(String);

impl Did {
    /// Parse and validate a DID string.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        let s = s.trim();
        let rest = s
            .strip_prefix("did:")
            .ok_or_else(|| CoreError::InvalidInput(format!("DID must start with \"did:\": {s:?}")))?;
        let (method, msid) = rest.split_once(':').ok_or_else(|| {
            CoreError::InvalidInput(format!("DID must have the form did:<method>:<id>: {s:?}"))
        })?;
        if method.is_empty()
            || !method
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        {
            return Err(CoreError::InvalidInput(format!(
                "DID method must be lowercase alphanumeric: {method:?}"
            )));
        }
        if msid.is_empty() || msid.ends_with(':') {
            return Err(CoreError::InvalidInput(format!(
                "DID method-specific id is empty: {s:?}"
            )));
        }
        if let Some(c) = msid
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | ':' | '%' | '-')))
        {
            return Err(CoreError::InvalidInput(format!(
                "DID contains invalid character {c:?}: {s:?}"
            )));
        }
        Ok(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The DID method, e.g. `ethr`.
    pub fn method(&self) -> &str {
        self.0
            .strip_prefix("did:")
            .and_then(|rest| rest.split(':').next())
            .unwrap_or_default()
    }

    /// Everything after `did:<method>:`.
    pub fn method_specific_id(&self) -> &str {
        let skip = "did:".len() + self.method().len() + 1;
        self.0.get(skip..).unwrap_or_default()
    }

    /// `<did>#<fragment>`.
    pub fn method_reference(&self, fragment: &str) -> String {
        format!("{}#{fragment}", self.0)
    }

    /// `<did>#controller`, the method every derived document publishes.
    pub fn controller_reference(&self) -> String {
        self.method_reference(CONTROLLER_FRAGMENT)
    }

    /// Whether `verification_method` is a `#fragment` reference into this DID.
    pub fn is_referenced_by(&self, verification_method: &str) -> bool {
        split_method_reference(verification_method).is_some_and(|(did, _)| did == self.0)
    }
}

impl std::fmt::Display for Did {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Did {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Did {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<Did> for String {
    fn from(did: Did) -> Self {
        did.0
    }
}

impl PartialEq<str> for Did {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Did {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Split `did:...#fragment` into the DID and the fragment.
///
/// Returns `None` unless both halves are non-empty.
pub fn split_method_reference(reference: &str) -> Option<(&str, &str)> {
    let (did, fragment) = reference.split_once('#')?;
    if did.is_empty() || fragment.is_empty() {
        return None;
    }
    Some((did, fragment))
}

// ---------------------------------------------------------------------------
// Key descriptors
// ---------------------------------------------------------------------------

/// Verification method types a document can publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyType {
    /// Wallet-controlled secp256k1 key, recovered from the signature.
    EcdsaSecp256k1RecoveryMethod2020,
    /// Ed25519 key published as `publicKeyHex`.
    Ed25519VerificationKey2020,
}

impl KeyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EcdsaSecp256k1RecoveryMethod2020 => "EcdsaSecp256k1RecoveryMethod2020",
            Self::Ed25519VerificationKey2020 => "Ed25519VerificationKey2020",
        }
    }
}

impl std::fmt::Display for KeyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Describes the key that will control a DID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyDescriptor {
    #[serde(rename = "type")]
    pub key_type: KeyType,
    /// Hex-encoded public key, when the key is not recoverable from the
    /// account address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key_hex: Option<String>,
}

impl KeyDescriptor {
    /// A wallet account key with no published key material.
    pub fn secp256k1_recovery() -> Self {
        Self {
            key_type: KeyType::EcdsaSecp256k1RecoveryMethod2020,
            public_key_hex: None,
        }
    }

    /// An Ed25519 key published as hex.
    pub fn ed25519(public_key_hex: impl Into<String>) -> Self {
        Self {
            key_type: KeyType::Ed25519VerificationKey2020,
            public_key_hex: Some(public_key_hex.into()),
        }
    }

    fn validate(&self) -> Result<(), CoreError> {
        if let Some(hex) = &self.public_key_hex {
            if hex.is_empty() || hex.len() % 2 != 0 || !hex.chars().all(|c| c.is_ascii_hexdigit())
            {
                return Err(CoreError::InvalidInput(format!(
                    "publicKeyHex must be non-empty even-length hex, got {} chars",
                    hex.len()
                )));
            }
        }
        if self.key_type == KeyType::Ed25519VerificationKey2020 && self.public_key_hex.is_none() {
            return Err(CoreError::InvalidInput(
                "Ed25519VerificationKey2020 requires publicKeyHex".into(),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

/// One entry of a document's `verificationMethod` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationMethod {
    pub id: String,
    #[serde(rename = "type")]
    pub key_type: KeyType,
    pub controller: Did,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blockchain_account_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key_hex: Option<String>,
}

/// A DID document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DidDocument {
    #[serde(rename = "@context")]
    pub context: Vec<String>,
    pub id: Did,
    pub verification_method: Vec<VerificationMethod>,
    #[serde(default)]
    pub authentication: Vec<String>,
    #[serde(default)]
    pub assertion_method: Vec<String>,
}

impl DidDocument {
    /// Look up a verification method by its full id.
    pub fn method(&self, id: &str) -> Option<&VerificationMethod> {
        self.verification_method.iter().find(|m| m.id == id)
    }

    /// Check the document's internal references.
    ///
    /// - `verificationMethod` is non-empty and every id is `<id>#<fragment>`.
    /// - Method ids are unique.
    /// - Every `authentication` and `assertionMethod` entry names a method.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.verification_method.is_empty() {
            return Err(CoreError::InvalidInput(format!(
                "document {} has no verification methods",
                self.id
            )));
        }
        for (i, m) in self.verification_method.iter().enumerate() {
            if !self.id.is_referenced_by(&m.id) {
                return Err(CoreError::InvalidInput(format!(
                    "verification method {:?} does not belong to {}",
                    m.id, self.id
                )));
            }
            if self.verification_method[..i].iter().any(|p| p.id == m.id) {
                return Err(CoreError::InvalidInput(format!(
                    "duplicate verification method {:?}",
                    m.id
                )));
            }
        }
        let dangling = self
            .authentication
            .iter()
            .chain(self.assertion_method.iter())
            .find(|r| self.method(r).is_none());
        if let Some(r) = dangling {
            return Err(CoreError::InvalidInput(format!(
                "reference {r:?} does not resolve to a verification method of {}",
                self.id
            )));
        }
        Ok(())
    }

    /// Whether `reference` may sign credentials for this DID.
    pub fn is_assertion_method(&self, reference: &str) -> bool {
        self.assertion_method.iter().any(|r| r == reference)
    }

    /// Whether `reference` may authenticate as this DID.
    pub fn is_authentication_method(&self, reference: &str) -> bool {
        self.authentication.iter().any(|r| r == reference)
    }
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Derive `did:ethr:<chain_reference>:<controller_address>`.
///
/// # Errors
///
/// `InvalidInput` if the address is empty or not `0x` + 40 hex digits, if
/// the chain reference is empty or not alphanumeric, or if the key
/// descriptor carries malformed key material.
pub fn derive_did(
    controller_address: &str,
    chain_reference: &str,
    key: &KeyDescriptor,
) -> Result<Did, CoreError> {
    let address = normalize_address(controller_address)?;
    let chain = chain_reference.trim();
    if chain.is_empty() || !chain.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(CoreError::InvalidInput(format!(
            "chain reference must be non-empty alphanumeric, got {chain_reference:?}"
        )));
    }
    key.validate()?;
    Did::parse(&format!("did:{ETHR_METHOD}:{chain}:{address}"))
}

/// Build the document for a derived DID.
///
/// The single verification method is `<did>#controller`; both
/// `authentication` and `assertionMethod` reference it.
pub fn build_document(did: &Did, key: &KeyDescriptor) -> Result<DidDocument, CoreError> {
    key.validate()?;
    let method_id = did.controller_reference();
    let method = VerificationMethod {
        id: method_id.clone(),
        key_type: key.key_type,
        controller: did.clone(),
        blockchain_account_id: blockchain_account_id(did),
        public_key_hex: key.public_key_hex.as_ref().map(|h| h.to_lowercase()),
    };
    let document = DidDocument {
        context: vec![DID_CONTEXT.to_string()],
        id: did.clone(),
        verification_method: vec![method],
        authentication: vec![method_id.clone()],
        assertion_method: vec![method_id],
    };
    document.validate()?;
    Ok(document)
}

/// `<address>@eip155:<chain>` for `did:ethr:<chain>:<address>`.
fn blockchain_account_id(did: &Did) -> Option<String> {
    if did.method() != ETHR_METHOD {
        return None;
    }
    let (chain, address) = did.method_specific_id().split_once(':')?;
    Some(format!("{address}@eip155:{chain}"))
}

fn normalize_address(address: &str) -> Result<String, CoreError> {
    let address = address.trim();
    if address.is_empty() {
        return Err(CoreError::InvalidInput("controller address is empty".into()));
    }
    let hex = address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .ok_or_else(|| {
            CoreError::InvalidInput(format!("controller address must start with 0x: {address:?}"))
        })?;
    if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(CoreError::InvalidInput(format!(
            "controller address must be 0x followed by 40 hex digits: {address:?}"
        )));
    }
    Ok(format!("0x{}", hex.to_lowercase()))
}
