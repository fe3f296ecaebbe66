//! # sdvc-crypto: Signing and Storage Primitives
//!
//! - **Ed25519** key pairs, public keys and signatures as hex-serde
//!   newtypes.
//! - **Signers**: the [`Signer`] strategy through which credentials and
//!   presentations obtain their proofs. [`Ed25519Signer`] signs in-process,
//!   [`EnvSigner`] loads its seed from the environment, and
//!   [`PlaceholderSigner`] emits the legacy sentinel proof values that no
//!   verifier accepts.
//! - **Content storage** for attachments referenced by `metadata.contentHash`.
//!
//! ## Crate Policy
//!
//! - Depends only on `sdvc-core` internally.
//! - Signing input is always `&CanonicalBytes`.
//! - No mocking of cryptographic operations in tests.

pub mod content;
pub mod ed25519;
pub mod error;
pub mod signer;

pub use content::{ContentStore, FsContentStore, MemoryContentStore};
pub use ed25519::{verify_proof_value, Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};
pub use error::CryptoError;
pub use signer::{
    is_placeholder, EnvSigner, Ed25519Signer, PlaceholderSigner, ProofSignature, Signer,
    ED25519_PROOF_TYPE, PLACEHOLDER_CREDENTIAL_SIGNATURE, PLACEHOLDER_DISCLOSURE_SIGNATURE,
    PLACEHOLDER_PROOF_TYPE,
};
