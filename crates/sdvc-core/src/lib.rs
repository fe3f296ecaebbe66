//! # sdvc-core: Foundational Types for the Credential Engine
//!
//! The leaf of the workspace dependency graph. Every other `sdvc-*` crate
//! builds on the primitives defined here; this crate depends on nothing
//! internal.
//!
//! ## Key Design Principles
//!
//! 1. **`CanonicalBytes` is the only signing input.** Credentials and
//!    presentations are signed over RFC 8785 (JCS) bytes produced by
//!    `CanonicalBytes::new()`. Issuer and verifier therefore agree on the
//!    exact byte sequence without sharing any serializer state.
//!
//! 2. **UTC-only timestamps.** `Timestamp` is UTC, truncated to seconds and
//!    rendered with a `Z` suffix, so dates survive a JSON round trip
//!    unchanged and canonicalize identically.
//!
//! 3. **Validated identifiers.** `Did` can only be built through a parser
//!    that enforces the `did:<method>:<id>` grammar, and `DidDocument`
//!    validates that every authentication and assertion reference resolves.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `sdvc-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod did;
pub mod digest;
pub mod error;
pub mod temporal;

pub use canonical::CanonicalBytes;
pub use did::{
    build_document, derive_did, split_method_reference, Did, DidDocument, KeyDescriptor,
    KeyType, VerificationMethod, CONTROLLER_FRAGMENT, DID_CONTEXT,
};
pub use digest::{sha256_digest, sha256_raw, ContentDigest, DigestAlgorithm};
pub use error::{CanonicalizationError, CoreError};
pub use temporal::Timestamp;
