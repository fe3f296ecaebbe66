//! # Proof Signers
//!
//! A [`Signer`] is the wallet seam: the credential builder and the
//! disclosure engine hand it canonical bytes and receive a proof value plus
//! the verification method that produced it. Where the key lives (process
//! memory, an environment variable, a browser wallet behind some bridge) is
//! the implementation's business.
//!
//! [`PlaceholderSigner`] reproduces the sentinel proofs that early wallets
//! attached before real signing existed. Verifiers recognise them through
//! [`is_placeholder()`] and never accept them.

use sdvc_core::CanonicalBytes;
use zeroize::Zeroizing;

use crate::ed25519::{Ed25519KeyPair, Ed25519PublicKey};
use crate::error::CryptoError;

/// Proof type produced by Ed25519 signers.
pub const ED25519_PROOF_TYPE: &str = "Ed25519Signature2020";

/// Proof type carried by legacy placeholder proofs.
pub const PLACEHOLDER_PROOF_TYPE: &str = "EcdsaSecp256k1Signature2019";

/// Sentinel proof value of an unsigned credential.
pub const PLACEHOLDER_CREDENTIAL_SIGNATURE: &str = "placeholder-signature";

/// Sentinel proof value of an unsigned disclosure.
pub const PLACEHOLDER_DISCLOSURE_SIGNATURE: &str = "placeholder-selective-disclosure-signature";

/// Whether `proof_value` is one of the sentinel values (the empty string
/// included) that stand in for a missing signature.
pub fn is_placeholder(proof_value: &str) -> bool {
    let v = proof_value.trim();
    v.is_empty() || v == PLACEHOLDER_CREDENTIAL_SIGNATURE || v == PLACEHOLDER_DISCLOSURE_SIGNATURE
}

/// Output of a signing operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofSignature {
    /// Encoded signature, placed in `proof.proofValue`.
    pub proof_value: String,
    /// The `<did>#<fragment>` reference of the signing key.
    pub verification_method: String,
}

/// Produces proofs over canonical bytes.
///
/// Implementations must be `Send + Sync` so one signer can serve
/// concurrent requests.
pub trait Signer: Send + Sync {
    /// Sign canonicalized data.
    fn sign(&self, data: &CanonicalBytes) -> Result<ProofSignature, CryptoError>;

    /// The verification method this signer controls.
    fn verification_method(&self) -> &str;

    /// Value for `proof.type`.
    fn proof_type(&self) -> &str;

    /// Human-readable name for diagnostics.
    fn signer_name(&self) -> &str;
}

impl<S: Signer + ?Sized> Signer for std::sync::Arc<S> {
    fn sign(&self, data: &CanonicalBytes) -> Result<ProofSignature, CryptoError> {
        (**self).sign(data)
    }

    fn verification_method(&self) -> &str {
        (**self).verification_method()
    }

    fn proof_type(&self) -> &str {
        (**self).proof_type()
    }

    fn signer_name(&self) -> &str {
        (**self).signer_name()
    }
}

// ─── Ed25519Signer ──────────────────────────────────────────────────────

/// In-process Ed25519 key bound to a verification method.
#[derive(Debug)]
pub struct Ed25519Signer {
    key: Ed25519KeyPair,
    verification_method: String,
}

impl Ed25519Signer {
    pub fn new(key: Ed25519KeyPair, verification_method: impl Into<String>) -> Self {
        Self {
            key,
            verification_method: verification_method.into(),
        }
    }

    /// Load from a 64-character hex seed.
    pub fn from_seed_hex(
        seed_hex: &str,
        verification_method: impl Into<String>,
    ) -> Result<Self, CryptoError> {
        Ok(Self::new(
            Ed25519KeyPair::from_seed_hex(seed_hex)?,
            verification_method,
        ))
    }

    pub fn public_key(&self) -> Ed25519PublicKey {
        self.key.public_key()
    }
}

impl Signer for Ed25519Signer {
    fn sign(&self, data: &CanonicalBytes) -> Result<ProofSignature, CryptoError> {
        Ok(ProofSignature {
            proof_value: self.key.sign(data).to_hex(),
            verification_method: self.verification_method.clone(),
        })
    }

    fn verification_method(&self) -> &str {
        &self.verification_method
    }

    fn proof_type(&self) -> &str {
        ED25519_PROOF_TYPE
    }

    fn signer_name(&self) -> &str {
        "Ed25519Signer"
    }
}

// ─── EnvSigner ──────────────────────────────────────────────────────────

/// Ed25519 signer whose seed is read from an environment variable.
///
/// The variable holds the 64-character hex seed. It is read once at
/// construction; the hex copy is zeroized after parsing.
///
/// ```bash
/// export SDVC_SIGNING_KEY="deadbeef..."  # 64 hex chars
/// ```
#[derive(Debug)]
pub struct EnvSigner {
    inner: Ed25519Signer,
    var_name: String,
}

impl EnvSigner {
    /// Load the seed from `var_name` and bind it to `verification_method`.
    ///
    /// Fails with `KeyError` if the variable is unset or not a 32-byte hex
    /// seed.
    pub fn from_env(
        var_name: &str,
        verification_method: impl Into<String>,
    ) -> Result<Self, CryptoError> {
        let hex = Zeroizing::new(std::env::var(var_name).map_err(|_| {
            CryptoError::KeyError(format!("environment variable {var_name} not set"))
        })?);
        let key = Ed25519KeyPair::from_seed_hex(&hex)
            .map_err(|e| CryptoError::KeyError(format!("{var_name}: {e}")))?;
        tracing::debug!(var = var_name, "loaded signing key from environment");
        Ok(Self {
            inner: Ed25519Signer::new(key, verification_method),
            var_name: var_name.to_string(),
        })
    }

    pub fn var_name(&self) -> &str {
        &self.var_name
    }

    pub fn public_key(&self) -> Ed25519PublicKey {
        self.inner.public_key()
    }
}

impl Signer for EnvSigner {
    fn sign(&self, data: &CanonicalBytes) -> Result<ProofSignature, CryptoError> {
        self.inner.sign(data)
    }

    fn verification_method(&self) -> &str {
        self.inner.verification_method()
    }

    fn proof_type(&self) -> &str {
        ED25519_PROOF_TYPE
    }

    fn signer_name(&self) -> &str {
        "EnvSigner"
    }
}

// ─── PlaceholderSigner ──────────────────────────────────────────────────

/// Emits a fixed sentinel proof value. Its proofs never verify.
#[derive(Debug, Clone)]
pub struct PlaceholderSigner {
    verification_method: String,
    sentinel: &'static str,
}

impl PlaceholderSigner {
    /// Sentinel used for credentials, `placeholder-signature`.
    pub fn credential(verification_method: impl Into<String>) -> Self {
        Self {
            verification_method: verification_method.into(),
            sentinel: PLACEHOLDER_CREDENTIAL_SIGNATURE,
        }
    }

    /// Sentinel used for disclosures,
    /// `placeholder-selective-disclosure-signature`.
    pub fn disclosure(verification_method: impl Into<String>) -> Self {
        Self {
            verification_method: verification_method.into(),
            sentinel: PLACEHOLDER_DISCLOSURE_SIGNATURE,
        }
    }
}

impl Signer for PlaceholderSigner {
    fn sign(&self, _data: &CanonicalBytes) -> Result<ProofSignature, CryptoError> {
        Ok(ProofSignature {
            proof_value: self.sentinel.to_string(),
            verification_method: self.verification_method.clone(),
        })
    }

    fn verification_method(&self) -> &str {
        &self.verification_method
    }

    fn proof_type(&self) -> &str {
        PLACEHOLDER_PROOF_TYPE
    }

    fn signer_name(&self) -> &str {
        "PlaceholderSigner"
    }
}
