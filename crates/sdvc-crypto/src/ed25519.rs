//! # Ed25519 Keys and Signatures
//!
//! Public keys and signatures travel as lowercase hex: a credential's
//! `proof.proofValue` is the 128-character hex of the signature, and a DID
//! document publishes `publicKeyHex`.
//!
//! ## Security Invariant
//!
//! - Signing and verification take `&CanonicalBytes`. Raw bytes cannot be
//!   signed.
//! - `Ed25519KeyPair` does not implement `Serialize`, and its `Debug` prints
//!   `<private>`. The seed leaves the type only through
//!   [`Ed25519KeyPair::seed_hex()`], which returns a zeroizing buffer.

use ed25519_dalek::{Signer as _, Verifier as _};
use sdvc_core::CanonicalBytes;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::Zeroizing;

use crate::error::CryptoError;

/// An Ed25519 public key (32 bytes).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Ed25519PublicKey(pub [u8; 32]);

/// An Ed25519 signature (64 bytes).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Ed25519Signature(pub [u8; 64]);

/// An Ed25519 signing key. The underlying dalek key zeroizes on drop.
pub struct Ed25519KeyPair {
    signing_key: ed25519_dalek::SigningKey,
}

// ---------------------------------------------------------------------------
// Ed25519PublicKey
// ---------------------------------------------------------------------------

impl Ed25519PublicKey {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        to_hex(&self.0)
    }

    /// Parse a public key from a 64-character hex string.
    pub fn from_hex(hex: &str) -> Result<Self, CryptoError> {
        let bytes = hex_to_array::<32>(hex).map_err(CryptoError::KeyError)?;
        Ok(Self(bytes))
    }

    /// Convert to a dalek verifying key. Fails for byte strings that are not
    /// a valid curve point.
    pub fn to_verifying_key(&self) -> Result<ed25519_dalek::VerifyingKey, CryptoError> {
        ed25519_dalek::VerifyingKey::from_bytes(&self.0)
            .map_err(|e| CryptoError::KeyError(format!("invalid public key: {e}")))
    }
}

impl Serialize for Ed25519PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Ed25519PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Self::from_hex(&hex).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Debug for Ed25519PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ed25519PublicKey({}...)", hex_prefix(&self.0))
    }
}

impl std::fmt::Display for Ed25519PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// ---------------------------------------------------------------------------
// Ed25519Signature
// ---------------------------------------------------------------------------

impl Ed25519Signature {
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        to_hex(&self.0)
    }

    /// Parse a signature from a 128-character hex string.
    pub fn from_hex(hex: &str) -> Result<Self, CryptoError> {
        let bytes = hex_to_array::<64>(hex).map_err(CryptoError::VerificationFailed)?;
        Ok(Self(bytes))
    }
}

impl Serialize for Ed25519Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Ed25519Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Self::from_hex(&hex).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Debug for Ed25519Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ed25519Signature({}...)", hex_prefix(&self.0))
    }
}

impl std::fmt::Display for Ed25519Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// ---------------------------------------------------------------------------
// Ed25519KeyPair
// ---------------------------------------------------------------------------

impl Ed25519KeyPair {
    /// Generate a key from the OS CSPRNG.
    pub fn generate() -> Self {
        let mut csprng = rand::rngs::OsRng;
        Self {
            signing_key: ed25519_dalek::SigningKey::generate(&mut csprng),
        }
    }

    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: ed25519_dalek::SigningKey::from_bytes(seed),
        }
    }

    /// Load a key from a 64-character hex seed, as written by `sdvc keygen`.
    pub fn from_seed_hex(hex: &str) -> Result<Self, CryptoError> {
        let seed = Zeroizing::new(hex_to_array::<32>(hex).map_err(CryptoError::KeyError)?);
        Ok(Self::from_seed(&seed))
    }

    /// Export the seed as hex for writing a key file.
    pub fn seed_hex(&self) -> Zeroizing<String> {
        let seed = Zeroizing::new(self.signing_key.to_bytes());
        Zeroizing::new(to_hex(seed.as_ref()))
    }

    pub fn public_key(&self) -> Ed25519PublicKey {
        Ed25519PublicKey(self.signing_key.verifying_key().to_bytes())
    }

    /// Sign canonical bytes.
    pub fn sign(&self, data: &CanonicalBytes) -> Ed25519Signature {
        Ed25519Signature(self.signing_key.sign(data.as_bytes()).to_bytes())
    }
}

impl std::fmt::Debug for Ed25519KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ed25519KeyPair(<private>)")
    }
}

// ---------------------------------------------------------------------------
// Verification
// ---------------------------------------------------------------------------

/// Verify an Ed25519 signature over canonical bytes.
pub fn verify(
    data: &CanonicalBytes,
    signature: &Ed25519Signature,
    public_key: &Ed25519PublicKey,
) -> Result<(), CryptoError> {
    let vk = public_key.to_verifying_key()?;
    let sig = ed25519_dalek::Signature::from_bytes(&signature.0);
    vk.verify(data.as_bytes(), &sig)
        .map_err(|e| CryptoError::VerificationFailed(format!("Ed25519 verification failed: {e}")))
}

/// Verify a hex-encoded `proofValue` against canonical bytes.
///
/// Fails with `VerificationFailed` when the proof value is not a 64-byte hex
/// signature, or when it does not verify under `public_key`.
pub fn verify_proof_value(
    data: &CanonicalBytes,
    proof_value: &str,
    public_key: &Ed25519PublicKey,
) -> Result<(), CryptoError> {
    let signature = Ed25519Signature::from_hex(proof_value)?;
    verify(data, &signature, public_key)
}

// ---------------------------------------------------------------------------
// Hex
// ---------------------------------------------------------------------------

pub(crate) fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn hex_prefix(bytes: &[u8]) -> String {
    to_hex(&bytes[..bytes.len().min(4)])
}

fn hex_to_array<const N: usize>(hex: &str) -> Result<[u8; N], String> {
    let hex = hex.trim();
    if hex.len() != N * 2 {
        return Err(format!("expected {} hex chars, got {}", N * 2, hex.len()));
    }
    if !hex.is_ascii() {
        return Err("hex string contains non-ASCII characters".to_string());
    }
    let mut out = [0u8; N];
    for (i, byte) in out.iter_mut().enumerate() {
        *byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16)
            .map_err(|e| format!("invalid hex at position {}: {e}", i * 2))?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canonical(value: serde_json::Value) -> CanonicalBytes {
        CanonicalBytes::new(&value).unwrap()
    }

    #[test]
    fn sign_and_verify() {
        let kp = Ed25519KeyPair::generate();
        let data = canonical(serde_json::json!({"name": "Alice", "idNumber": "X123"}));
        let sig = kp.sign(&data);
        verify(&data, &sig, &kp.public_key()).expect("valid signature should verify");
    }

    #[test]
    fn wrong_key_fails() {
        let signer = Ed25519KeyPair::generate();
        let other = Ed25519KeyPair::generate();
        let data = canonical(serde_json::json!({"test": true}));
        let sig = signer.sign(&data);
        assert!(verify(&data, &sig, &other.public_key()).is_err());
    }

    #[test]
    fn tampered_message_fails() {
        let kp = Ed25519KeyPair::generate();
        let sig = kp.sign(&canonical(serde_json::json!({"name": "Alice"})));
        let result = verify(
            &canonical(serde_json::json!({"name": "Mallory"})),
            &sig,
            &kp.public_key(),
        );
        assert!(matches!(result, Err(CryptoError::VerificationFailed(_))));
    }

    #[test]
    fn proof_value_verification() {
        let kp = Ed25519KeyPair::generate();
        let data = canonical(serde_json::json!({"x": 1}));
        let proof_value = kp.sign(&data).to_hex();
        assert_eq!(proof_value.len(), 128);
        verify_proof_value(&data, &proof_value, &kp.public_key()).unwrap();
        assert!(verify_proof_value(&data, "placeholder-signature", &kp.public_key()).is_err());
        assert!(verify_proof_value(&data, "", &kp.public_key()).is_err());
    }

    #[test]
    fn seed_hex_reloads_same_key() {
        let kp = Ed25519KeyPair::generate();
        let seed = kp.seed_hex();
        assert_eq!(seed.len(), 64);
        let reloaded = Ed25519KeyPair::from_seed_hex(&seed).unwrap();
        assert_eq!(kp.public_key(), reloaded.public_key());
    }

    #[test]
    fn deterministic_from_seed() {
        let kp1 = Ed25519KeyPair::from_seed(&[42u8; 32]);
        let kp2 = Ed25519KeyPair::from_seed(&[42u8; 32]);
        let data = canonical(serde_json::json!({"test": "deterministic"}));
        assert_eq!(kp1.public_key(), kp2.public_key());
        assert_eq!(kp1.sign(&data), kp2.sign(&data));
    }

    #[test]
    fn public_key_serializes_as_hex_string() {
        let pk = Ed25519KeyPair::generate().public_key();
        let json = serde_json::to_string(&pk).unwrap();
        assert_eq!(json.len(), 64 + 2);
        let back: Ed25519PublicKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pk);
    }

    #[test]
    fn invalid_hex_is_rejected() {
        assert!(Ed25519PublicKey::from_hex("not-hex").is_err());
        assert!(Ed25519PublicKey::from_hex("aabb").is_err());
        assert!(Ed25519PublicKey::from_hex(&"zz".repeat(32)).is_err());
        assert!(Ed25519Signature::from_hex("aabb").is_err());
        assert!(Ed25519KeyPair::from_seed_hex(&"é".repeat(32)).is_err());
    }

    #[test]
    fn debug_does_not_leak_private_key() {
        let kp = Ed25519KeyPair::generate();
        let debug = format!("{kp:?}");
        assert_eq!(debug, "Ed25519KeyPair(<private>)");
        assert!(!debug.contains(kp.seed_hex().as_str()));
    }

    #[test]
    fn debug_public_key_shows_prefix() {
        let debug = format!("{:?}", Ed25519KeyPair::generate().public_key());
        assert!(debug.starts_with("Ed25519PublicKey("));
        assert!(debug.ends_with("...)"));
    }
}
