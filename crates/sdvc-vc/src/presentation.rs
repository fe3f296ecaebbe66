//! # Disclosure Engine
//!
//! Derives a [`DisclosurePresentation`] exposing a chosen subset of a
//! credential's claims, signed by the holder.
//!
//! The presentation does not embed the issuer's proof: the issuer signed
//! the full claim set, and a subset cannot be checked against that
//! signature. A verifier instead resolves the source credential by
//! `sourceCredentialId` and compares the disclosed values with it.
//!
//! ## Signed payload
//!
//! The holder signs the JCS rendering of
//!
//! ```text
//! {sourceCredentialId, verifiableCredential, disclosedFields,
//!  disclosedData, holder, created, nonce}
//! ```
//!
//! where `created` and `nonce` come from the proof. The nonce is fresh per
//! call, so two disclosures of the same fields are distinct attestations.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use sdvc_core::{CanonicalBytes, Timestamp};
use sdvc_crypto::Signer;

use crate::credential::{Credential, BASE_CONTEXT};
use crate::error::VcError;
use crate::proof::{Proof, ProofPurpose, ProofType};

/// `type` of every presentation.
pub const PRESENTATION_TYPE: &str = "VerifiablePresentation";

/// Envelope of the source credential, without claims or proof.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialSummary {
    pub id: String,
    #[serde(rename = "type")]
    pub credential_type: Vec<String>,
    pub issuer: String,
    pub issuance_date: Timestamp,
}

impl From<&Credential> for CredentialSummary {
    fn from(credential: &Credential) -> Self {
        Self {
            id: credential.id.clone(),
            credential_type: credential.credential_type.clone(),
            issuer: credential.issuer.clone(),
            issuance_date: credential.issuance_date,
        }
    }
}

/// A holder-signed partial disclosure of one credential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisclosurePresentation {
    #[serde(rename = "@context", alias = "context")]
    pub context: Vec<String>,
    #[serde(rename = "type")]
    pub presentation_type: Vec<String>,
    pub source_credential_id: String,
    pub verifiable_credential: CredentialSummary,
    /// Requested fields, first occurrence order.
    pub disclosed_fields: Vec<String>,
    /// Projection of `credentialSubject` onto `disclosed_fields`.
    pub disclosed_data: BTreeMap<String, Value>,
    pub holder: String,
    pub proof: Proof,
}

impl DisclosurePresentation {
    /// Canonical bytes the holder signs.
    pub fn signing_input(&self) -> Result<CanonicalBytes, VcError> {
        let value = serde_json::to_value(self)?;
        signing_input_of(&value)
    }
}

/// Build the holder's signing payload from a received presentation.
///
/// Absent members become `null` so that a truncated presentation yields a
/// payload that simply fails to verify.
pub(crate) fn signing_input_of(candidate: &Value) -> Result<CanonicalBytes, VcError> {
    let member = |key: &str| candidate.get(key).cloned().unwrap_or(Value::Null);
    let proof_member = |key: &str| {
        candidate
            .get("proof")
            .and_then(|p| p.get(key))
            .cloned()
            .unwrap_or(Value::Null)
    };
    let mut payload = Map::new();
    payload.insert("sourceCredentialId".into(), member("sourceCredentialId"));
    payload.insert("verifiableCredential".into(), member("verifiableCredential"));
    payload.insert("disclosedFields".into(), member("disclosedFields"));
    payload.insert("disclosedData".into(), member("disclosedData"));
    payload.insert("holder".into(), member("holder"));
    payload.insert("created".into(), proof_member("created"));
    payload.insert("nonce".into(), proof_member("nonce"));
    Ok(CanonicalBytes::from_value(Value::Object(payload))?)
}

/// Disclose `fields` of `credential`, signed by the holder now.
///
/// # Errors
///
/// - `InvalidInput` when `fields` is empty.
/// - `FieldNotFound` naming the first field, in input order, that is `id`
///   or not a claim of the credential.
/// - `Signing` when the signer fails or does not control
///   `<holder>#controller`.
pub fn disclose<S: AsRef<str>>(
    credential: &Credential,
    fields: &[S],
    holder_signer: &dyn Signer,
) -> Result<DisclosurePresentation, VcError> {
    disclose_at(credential, fields, holder_signer, Timestamp::now())
}

/// [`disclose()`] with an explicit creation time.
pub fn disclose_at<S: AsRef<str>>(
    credential: &Credential,
    fields: &[S],
    holder_signer: &dyn Signer,
    created: Timestamp,
) -> Result<DisclosurePresentation, VcError> {
    if fields.is_empty() {
        return Err(VcError::InvalidInput(
            "at least one field must be disclosed".into(),
        ));
    }

    let claims = &credential.credential_subject.claims;
    let mut disclosed_fields: Vec<String> = Vec::with_capacity(fields.len());
    let mut disclosed_data = BTreeMap::new();
    for field in fields {
        let field = field.as_ref();
        let value = match claims.get(field) {
            Some(value) if field != "id" => value,
            _ => {
                return Err(VcError::FieldNotFound {
                    field: field.to_string(),
                })
            }
        };
        if disclosed_data.insert(field.to_string(), value.clone()).is_none() {
            disclosed_fields.push(field.to_string());
        }
    }

    let holder = credential.holder().to_string();
    let verification_method = format!("{holder}#{}", sdvc_core::CONTROLLER_FRAGMENT);
    if holder_signer.verification_method() != verification_method {
        return Err(VcError::Signing(format!(
            "{} controls {}, disclosure requires {}",
            holder_signer.signer_name(),
            holder_signer.verification_method(),
            verification_method
        )));
    }

    let mut presentation = DisclosurePresentation {
        context: vec![BASE_CONTEXT.to_string()],
        presentation_type: vec![PRESENTATION_TYPE.to_string()],
        source_credential_id: credential.id.clone(),
        verifiable_credential: CredentialSummary::from(credential),
        disclosed_fields,
        disclosed_data,
        holder,
        proof: Proof {
            proof_type: ProofType::parse(holder_signer.proof_type()),
            created,
            verification_method: verification_method.clone(),
            proof_purpose: ProofPurpose::Authentication,
            proof_value: String::new(),
            nonce: Some(uuid::Uuid::new_v4().simple().to_string()),
        },
    };

    let input = presentation.signing_input()?;
    let signature = holder_signer
        .sign(&input)
        .map_err(|e| VcError::Signing(e.to_string()))?;
    if signature.verification_method != verification_method {
        return Err(VcError::Signing(format!(
            "signature produced by {}, expected {}",
            signature.verification_method, verification_method
        )));
    }
    presentation.proof.proof_value = signature.proof_value;

    tracing::debug!(
        source = %presentation.source_credential_id,
        fields = presentation.disclosed_fields.len(),
        "created disclosure"
    );
    Ok(presentation)
}
