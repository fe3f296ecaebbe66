//! # Credential Builder
//!
//! Turns a claim set into a signed [`Credential`]:
//!
//! ```text
//! IssuanceRequest ──validate──▶ envelope ──canonicalize (minus proof)──▶ Signer ──▶ Credential
//! ```
//!
//! ## Security Invariants
//!
//! - The signing input is the JCS rendering of the credential with `proof`
//!   removed. The verifier recomputes exactly this from the received JSON.
//! - The signer must control `<issuer>#controller`. A signer bound to any
//!   other method is refused before signing.
//! - Claims are scalars only (string, boolean, integer), so every claim has
//!   one canonical rendering and can be disclosed on its own.
//!
//! Issuance has no side effects. Storing the credential is the caller's
//! concern (see [`crate::store`]).

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use sdvc_core::{CanonicalBytes, ContentDigest, Did, Timestamp};
use sdvc_crypto::Signer;

use crate::error::VcError;
use crate::proof::{Proof, ProofPurpose, ProofType};

/// First `@context` entry of every credential and presentation.
pub const BASE_CONTEXT: &str = "https://www.w3.org/2018/credentials/v1";

/// Second `@context` entry of issued credentials.
pub const EXAMPLES_CONTEXT: &str = "https://www.w3.org/2018/credentials/examples/v1";

/// First entry of every credential's `type`.
pub const VC_TYPE: &str = "VerifiableCredential";

/// A signed Verifiable Credential.
///
/// A credential parsed from JSON keeps that JSON. Serializing it again
/// yields the received document, aliases, sub-second timestamps and unknown
/// members included, so the issuer's proof still verifies after the
/// credential has passed through a store. Once a field is changed the
/// typed rendering is used instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(remote = "Self", rename_all = "camelCase")]
pub struct Credential {
    #[serde(rename = "@context", alias = "context")]
    pub context: Vec<String>,
    /// `vc:<unix-millis>:<random hex>`.
    pub id: String,
    /// `["VerifiableCredential", <subtype>]`.
    #[serde(rename = "type")]
    pub credential_type: Vec<String>,
    /// Issuer DID.
    pub issuer: String,
    pub issuance_date: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<Timestamp>,
    pub credential_subject: CredentialSubject,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<CredentialMetadata>,
    pub proof: Proof,
    #[serde(skip)]
    received: ReceivedJson,
}

/// The document a [`Credential`] was parsed from. Never part of equality.
#[derive(Debug, Clone, Default)]
struct ReceivedJson(Option<Value>);

impl PartialEq for ReceivedJson {
    fn eq(&self, _: &Self) -> bool {
        true
    }
}

impl Serialize for Credential {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.current_received() {
            Some(raw) => raw.serialize(serializer),
            None => Credential::serialize(self, serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Credential {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        let mut credential =
            Credential::deserialize(raw.clone()).map_err(serde::de::Error::custom)?;
        credential.received = ReceivedJson(Some(raw));
        Ok(credential)
    }
}

/// `credentialSubject`: the holder's DID followed by flat claims.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialSubject {
    pub id: String,
    #[serde(flatten)]
    pub claims: BTreeMap<String, Value>,
}

/// Reference to the document the credential attests, by content digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialMetadata {
    /// `sha256:<hex>` for blobs in a `ContentStore`; legacy wallets stored
    /// an IPFS CID here under `ipfsHash`.
    #[serde(alias = "ipfsHash")]
    pub content_hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
}

impl CredentialMetadata {
    pub fn for_digest(digest: &ContentDigest) -> Self {
        Self {
            content_hash: digest.to_string(),
            file_name: None,
            file_type: None,
        }
    }
}

/// Input to [`issue()`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuanceRequest {
    pub issuer: Did,
    pub holder: Did,
    /// Subtype appended after `VerifiableCredential`, e.g. `IdentityCredential`.
    pub credential_type: String,
    pub subject_claims: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<CredentialMetadata>,
}

impl Credential {
    /// The holder DID (`credentialSubject.id`).
    pub fn holder(&self) -> &str {
        &self.credential_subject.id
    }

    /// The subtype after `VerifiableCredential`, if any.
    pub fn subtype(&self) -> Option<&str> {
        self.credential_type
            .iter()
            .map(String::as_str)
            .find(|t| *t != VC_TYPE)
    }

    /// Whether the credential has expired at `now`.
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        self.expiration_date.is_some_and(|exp| exp <= now)
    }

    /// Canonical bytes the issuer signs: the credential without `proof`.
    pub fn signing_input(&self) -> Result<CanonicalBytes, VcError> {
        signing_input_of(&self.to_json()?)
    }

    /// The credential as the JSON its proof covers: the received document
    /// while the fields still match it, the typed rendering otherwise.
    pub fn to_json(&self) -> Result<Value, VcError> {
        Ok(serde_json::to_value(self)?)
    }

    fn current_received(&self) -> Option<&Value> {
        let raw = self.received.0.as_ref()?;
        let reparsed = Credential::deserialize(raw.clone()).ok()?;
        (reparsed == *self).then_some(raw)
    }
}

/// Canonicalize a received credential with its `proof` member removed.
pub(crate) fn signing_input_of(candidate: &Value) -> Result<CanonicalBytes, VcError> {
    let mut body = candidate.clone();
    if let Some(obj) = body.as_object_mut() {
        obj.remove("proof");
    }
    Ok(CanonicalBytes::from_value(body)?)
}

/// Issue a credential dated now.
///
/// # Errors
///
/// - `InvalidInput` when the claims are empty, a claim is named `id` or is
///   not a scalar, the type is empty or the bare `VerifiableCredential`
///   sentinel, or the expiration is not after issuance.
/// - `Signing` when the signer fails or does not control
///   `<issuer>#controller`.
pub fn issue(request: IssuanceRequest, signer: &dyn Signer) -> Result<Credential, VcError> {
    issue_at(request, signer, Timestamp::now())
}

/// [`issue()`] with an explicit issuance time.
pub fn issue_at(
    request: IssuanceRequest,
    signer: &dyn Signer,
    issued_at: Timestamp,
) -> Result<Credential, VcError> {
    validate_request(&request, issued_at)?;

    let verification_method = request.issuer.controller_reference();
    if signer.verification_method() != verification_method {
        return Err(VcError::Signing(format!(
            "{} controls {}, issuance requires {}",
            signer.signer_name(),
            signer.verification_method(),
            verification_method
        )));
    }

    let mut credential = Credential {
        context: vec![BASE_CONTEXT.to_string(), EXAMPLES_CONTEXT.to_string()],
        id: new_credential_id(),
        credential_type: vec![VC_TYPE.to_string(), request.credential_type.trim().to_string()],
        issuer: request.issuer.to_string(),
        issuance_date: issued_at,
        expiration_date: request.expiration_date,
        credential_subject: CredentialSubject {
            id: request.holder.to_string(),
            claims: request.subject_claims,
        },
        metadata: request.metadata,
        proof: Proof {
            proof_type: ProofType::parse(signer.proof_type()),
            created: issued_at,
            verification_method: verification_method.clone(),
            proof_purpose: ProofPurpose::AssertionMethod,
            proof_value: String::new(),
            nonce: None,
        },
        received: ReceivedJson::default(),
    };

    let input = credential.signing_input()?;
    let signature = signer
        .sign(&input)
        .map_err(|e| VcError::Signing(e.to_string()))?;
    if signature.verification_method != verification_method {
        return Err(VcError::Signing(format!(
            "signature produced by {}, expected {}",
            signature.verification_method, verification_method
        )));
    }
    credential.proof.proof_value = signature.proof_value;

    tracing::debug!(
        id = %credential.id,
        issuer = %credential.issuer,
        signer = signer.signer_name(),
        "issued credential"
    );
    Ok(credential)
}

fn validate_request(request: &IssuanceRequest, issued_at: Timestamp) -> Result<(), VcError> {
    if request.subject_claims.is_empty() {
        return Err(VcError::InvalidInput("subject claims must not be empty".into()));
    }
    let subtype = request.credential_type.trim();
    if subtype.is_empty() {
        return Err(VcError::InvalidInput("credential type must not be empty".into()));
    }
    if subtype == VC_TYPE {
        return Err(VcError::InvalidInput(format!(
            "credential type must name a subtype of {VC_TYPE}"
        )));
    }
    for (name, value) in &request.subject_claims {
        if name == "id" {
            return Err(VcError::InvalidInput(
                "claim \"id\" is reserved for the holder DID".into(),
            ));
        }
        if name.is_empty() {
            return Err(VcError::InvalidInput("claim names must not be empty".into()));
        }
        if !is_scalar(value) {
            return Err(VcError::InvalidInput(format!(
                "claim {name:?} must be a string, boolean or integer"
            )));
        }
    }
    if let Some(exp) = request.expiration_date {
        if exp <= issued_at {
            return Err(VcError::InvalidInput(format!(
                "expiration date {exp} must be after issuance date {issued_at}"
            )));
        }
    }
    Ok(())
}

fn is_scalar(value: &Value) -> bool {
    match value {
        Value::String(_) | Value::Bool(_) => true,
        Value::Number(n) => n.is_i64() || n.is_u64(),
        Value::Null | Value::Array(_) | Value::Object(_) => false,
    }
}

fn new_credential_id() -> String {
    format!(
        "vc:{}:{}",
        chrono::Utc::now().timestamp_millis(),
        uuid::Uuid::new_v4().simple()
    )
}
