//! # sdvc-vc: Credentials, Disclosures and Verification
//!
//! The protocol layer of the engine:
//!
//! - [`credential`]: builds and signs credentials from a claim set.
//! - [`presentation`]: derives holder-signed partial disclosures.
//! - [`verify`]: checks either artifact and explains the verdict in a
//!   [`VerificationReport`].
//! - [`resolve`]: how the verifier finds keys and source credentials,
//!   including the in-memory [`DidRegistry`].
//! - [`store`]: holder-scoped credential persistence.
//!
//! Issuance and disclosure obtain signatures through
//! [`sdvc_crypto::Signer`]; verification obtains keys through
//! [`KeyResolver`]. Neither side knows where keys live.
//!
//! ## Crate Policy
//!
//! - Every signature covers `CanonicalBytes`. Verifiers canonicalize the
//!   received JSON, never a typed re-serialization of it.
//! - Verification failures are report entries, not errors.

pub mod credential;
pub mod error;
pub mod presentation;
pub mod proof;
pub mod resolve;
pub mod store;
pub mod verify;

pub use credential::{
    issue, issue_at, Credential, CredentialMetadata, CredentialSubject, IssuanceRequest,
    BASE_CONTEXT, EXAMPLES_CONTEXT, VC_TYPE,
};
pub use error::VcError;
pub use presentation::{
    disclose, disclose_at, CredentialSummary, DisclosurePresentation, PRESENTATION_TYPE,
};
pub use proof::{Proof, ProofPurpose, ProofType};
pub use resolve::{CredentialResolver, DidRegistry, KeyResolver, NoKeyMaterial};
pub use store::{CredentialStore, FileCredentialStore, InMemoryCredentialStore};
pub use verify::{
    verify, verify_credential, verify_credential_at, verify_presentation, verify_presentation_at,
    ArtifactKind, ReportStatus, ReportSummary, VerificationReport,
};
