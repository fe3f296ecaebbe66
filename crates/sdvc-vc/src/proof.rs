//! # Proof Objects
//!
//! The proof binds a signature, the verification method that produced it
//! and a creation time to a payload. Credentials carry an
//! `assertionMethod` proof from the issuer; presentations carry an
//! `authentication` proof from the holder, with a per-call `nonce`.
//!
//! Proof types the engine does not know are preserved verbatim so that
//! foreign artifacts survive a parse/serialize cycle.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use sdvc_core::Timestamp;

/// The signature scheme named in `proof.type`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProofType {
    /// Ed25519 over the canonical payload, hex-encoded.
    Ed25519Signature2020,
    /// Wallet (secp256k1) signature. Also the type of legacy placeholder
    /// proofs.
    EcdsaSecp256k1Signature2019,
    /// Anything else, kept as received.
    Other(String),
}

impl ProofType {
    pub fn parse(s: &str) -> Self {
        match s {
            "Ed25519Signature2020" => Self::Ed25519Signature2020,
            "EcdsaSecp256k1Signature2019" => Self::EcdsaSecp256k1Signature2019,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Ed25519Signature2020 => "Ed25519Signature2020",
            Self::EcdsaSecp256k1Signature2019 => "EcdsaSecp256k1Signature2019",
            Self::Other(s) => s,
        }
    }

    pub fn is_ed25519(&self) -> bool {
        matches!(self, Self::Ed25519Signature2020)
    }
}

impl std::fmt::Display for ProofType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ProofType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ProofType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::parse(&s))
    }
}

/// W3C proof purpose vocabulary. Legacy wallet proofs omit it, in which
/// case it reads as `assertionMethod`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProofPurpose {
    /// The issuer asserts the claims.
    #[default]
    AssertionMethod,
    /// The holder authenticates the presentation.
    Authentication,
}

impl std::fmt::Display for ProofPurpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AssertionMethod => f.write_str("assertionMethod"),
            Self::Authentication => f.write_str("authentication"),
        }
    }
}

/// A proof attached to a credential or presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proof {
    #[serde(rename = "type")]
    pub proof_type: ProofType,
    pub created: Timestamp,
    /// `<did>#<fragment>` of the signing key.
    pub verification_method: String,
    #[serde(default)]
    pub proof_purpose: ProofPurpose,
    /// Encoded signature. Hex for Ed25519 proofs.
    pub proof_value: String,
    /// Per-presentation random value covered by the holder's signature.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
}
