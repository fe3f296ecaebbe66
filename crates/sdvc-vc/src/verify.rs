//! # Verifier
//!
//! Checks a received credential or presentation and explains the verdict.
//!
//! ```text
//! Received ──JSON object?──▶ StructurallyChecked ──all checks──▶ Valid | Invalid
//! ```
//!
//! Every check runs regardless of earlier failures so that the report lists
//! everything wrong with an artifact, not just the first problem.
//!
//! ## Signature checks
//!
//! A proof value that is absent, empty or one of the placeholder sentinels
//! always fails. Otherwise the verification method is handed to the
//! [`KeyResolver`]:
//!
//! - a key is found: the signature must verify over the canonical bytes
//!   rebuilt from the received JSON;
//! - no key is found: the check passes on presence alone and the report
//!   status becomes [`ReportStatus::PartiallyVerified`].
//!
//! ## Presentations
//!
//! The holder's proof is checked like a credential proof. The disclosure is
//! then compared against the source credential obtained from the
//! [`CredentialResolver`], and the source itself is verified with the same
//! key resolver: a presentation of a forged credential is not valid.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use sdvc_core::{split_method_reference, CanonicalBytes, Did, Timestamp};
use sdvc_crypto::{is_placeholder, verify_proof_value};

use crate::credential::{self, Credential, BASE_CONTEXT, VC_TYPE};
use crate::error::VcError;
use crate::presentation::{self, PRESENTATION_TYPE};
use crate::resolve::{CredentialResolver, KeyResolver};

// Check names, as they appear in `checks`.
const HAS_CONTEXT: &str = "hasContext";
const HAS_TYPE: &str = "hasType";
const HAS_ISSUER: &str = "hasIssuer";
const HAS_HOLDER: &str = "hasHolder";
const HAS_PROOF: &str = "hasProof";
const HAS_ISSUANCE_DATE: &str = "hasIssuanceDate";
const SUBJECT_PRESENT: &str = "credentialSubjectPresent";
const DISCLOSED_DATA_PRESENT: &str = "disclosedDataPresent";
const NOT_EXPIRED: &str = "notExpired";
const ISSUER_VERIFIED: &str = "issuerVerified";
const HOLDER_VERIFIED: &str = "holderVerified";
const SIGNATURE_VALID: &str = "signatureValid";
const DISCLOSURE_CONSISTENT: &str = "disclosureConsistent";
const SOURCE_RESOLVABLE: &str = "sourceResolvable";
const FIELDS_SUBSET: &str = "fieldsSubsetOfSource";
const VALUE_CONSISTENCY: &str = "valueConsistency";
const HOLDER_MATCHES_SUBJECT: &str = "holderMatchesSubject";
const SOURCE_VALID: &str = "sourceCredentialValid";
const SOURCE_SUMMARY_CONSISTENT: &str = "sourceSummaryConsistent";

/// Overall verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReportStatus {
    /// Every check passed and every signature was verified with a key.
    Valid,
    /// Every check passed, but at least one signature could only be
    /// checked for presence.
    PartiallyVerified,
    /// At least one check failed.
    Invalid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ArtifactKind {
    Credential,
    Presentation,
}

/// What the artifact claims to be, echoed for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub kind: ArtifactKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuance_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_credential_id: Option<String>,
}

/// Pass/fail breakdown plus the overall verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationReport {
    /// AND of all checks.
    pub valid: bool,
    pub status: ReportStatus,
    pub checks: BTreeMap<String, bool>,
    pub message: String,
    pub summary: ReportSummary,
}

impl VerificationReport {
    /// Result of the named check, `None` if it was not run.
    pub fn check(&self, name: &str) -> Option<bool> {
        self.checks.get(name).copied()
    }

    /// Names of the failed checks, in name order.
    pub fn failed_checks(&self) -> Vec<&str> {
        self.checks
            .iter()
            .filter(|(_, ok)| !**ok)
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Verify either artifact, dispatching on `type`.
pub fn verify(
    candidate: &Value,
    credentials: &dyn CredentialResolver,
    keys: &dyn KeyResolver,
) -> Result<VerificationReport, VcError> {
    if type_list(candidate).iter().any(|t| *t == PRESENTATION_TYPE) {
        verify_presentation(candidate, credentials, keys)
    } else {
        verify_credential(candidate, keys)
    }
}

/// Verify a credential at the current time.
///
/// # Errors
///
/// `MalformedInput` only when `candidate` is not a JSON object.
pub fn verify_credential(
    candidate: &Value,
    keys: &dyn KeyResolver,
) -> Result<VerificationReport, VcError> {
    verify_credential_at(candidate, keys, Timestamp::now())
}

/// [`verify_credential()`] with an explicit clock.
pub fn verify_credential_at(
    candidate: &Value,
    keys: &dyn KeyResolver,
    now: Timestamp,
) -> Result<VerificationReport, VcError> {
    let obj = candidate
        .as_object()
        .ok_or_else(|| VcError::MalformedInput("credential must be a JSON object".into()))?;
    let mut checks = CheckSet::default();

    checks.record(HAS_CONTEXT, first_context_is_base(obj));
    checks.record(HAS_TYPE, type_list(candidate).first() == Some(&VC_TYPE));
    let issuer = issuer_id(obj);
    checks.record(HAS_ISSUER, issuer.is_some());
    let proof = obj.get("proof").and_then(Value::as_object);
    checks.record(HAS_PROOF, proof.is_some());
    checks.record(
        HAS_ISSUANCE_DATE,
        timestamp_member(obj, "issuanceDate").is_some_and(|r| r.is_ok()),
    );
    let subject = obj.get("credentialSubject").and_then(Value::as_object);
    checks.record(SUBJECT_PRESENT, subject.is_some_and(|s| !s.is_empty()));
    checks.record(NOT_EXPIRED, not_expired(obj, now));

    let verification_method = proof.and_then(|p| str_member(p, "verificationMethod"));
    checks.record(ISSUER_VERIFIED, controls(issuer, verification_method));
    let signature = check_signature(proof, || credential::signing_input_of(candidate), keys);
    checks.record_signature(SIGNATURE_VALID, signature);

    let summary = ReportSummary {
        kind: ArtifactKind::Credential,
        credential_type: credential_subtype(candidate),
        issuer: issuer.map(str::to_string),
        holder: subject.and_then(|s| str_member(s, "id")).map(str::to_string),
        issuance_date: str_member(obj, "issuanceDate").map(str::to_string),
        expiration_date: str_member(obj, "expirationDate").map(str::to_string),
        source_credential_id: None,
    };
    let report = checks.finish(summary, "Credential");
    tracing::debug!(
        status = ?report.status,
        failed = ?report.failed_checks(),
        "verified credential"
    );
    Ok(report)
}

/// Verify a presentation at the current time.
///
/// # Errors
///
/// - `MalformedInput` when `candidate` is not a JSON object.
/// - Whatever the resolver returns when the source lookup itself fails,
///   typically `Storage`. A missing source is a failed check, not an error.
pub fn verify_presentation(
    candidate: &Value,
    credentials: &dyn CredentialResolver,
    keys: &dyn KeyResolver,
) -> Result<VerificationReport, VcError> {
    verify_presentation_at(candidate, credentials, keys, Timestamp::now())
}

/// [`verify_presentation()`] with an explicit clock.
pub fn verify_presentation_at(
    candidate: &Value,
    credentials: &dyn CredentialResolver,
    keys: &dyn KeyResolver,
    now: Timestamp,
) -> Result<VerificationReport, VcError> {
    let obj = candidate
        .as_object()
        .ok_or_else(|| VcError::MalformedInput("presentation must be a JSON object".into()))?;
    let mut checks = CheckSet::default();

    checks.record(HAS_CONTEXT, first_context_is_base(obj));
    checks.record(
        HAS_TYPE,
        type_list(candidate).iter().any(|t| *t == PRESENTATION_TYPE),
    );
    let holder = str_member(obj, "holder").filter(|h| !h.trim().is_empty());
    checks.record(HAS_HOLDER, holder.is_some());
    let proof = obj.get("proof").and_then(Value::as_object);
    checks.record(HAS_PROOF, proof.is_some());
    let disclosed = obj.get("disclosedData").and_then(Value::as_object);
    checks.record(DISCLOSED_DATA_PRESENT, disclosed.is_some_and(|d| !d.is_empty()));

    let verification_method = proof.and_then(|p| str_member(p, "verificationMethod"));
    checks.record(HOLDER_VERIFIED, controls(holder, verification_method));
    let signature = check_signature(proof, || presentation::signing_input_of(candidate), keys);
    checks.record_signature(SIGNATURE_VALID, signature);
    checks.record(DISCLOSURE_CONSISTENT, disclosure_consistent(obj, disclosed));

    let source_id = str_member(obj, "sourceCredentialId");
    let source = match source_id {
        Some(id) => credentials.resolve_credential(id)?,
        None => None,
    };
    checks.record(SOURCE_RESOLVABLE, source.is_some());

    let empty = Map::new();
    let disclosed = disclosed.unwrap_or(&empty);
    match &source {
        Some(source) => {
            let claims = &source.credential_subject.claims;
            checks.record(
                FIELDS_SUBSET,
                disclosed.keys().all(|k| k != "id" && claims.contains_key(k)),
            );
            checks.record(
                VALUE_CONSISTENCY,
                disclosed.iter().all(|(k, v)| claims.get(k) == Some(v)),
            );
            checks.record(HOLDER_MATCHES_SUBJECT, holder == Some(source.holder()));
            checks.record(NOT_EXPIRED, !source.is_expired_at(now));
            checks.record(
                SOURCE_SUMMARY_CONSISTENT,
                summary_consistent(obj.get("verifiableCredential"), source),
            );

            let source_report = verify_credential_at(&source.to_json()?, keys, now)?;
            checks.record(SOURCE_VALID, source_report.valid);
            if source_report.status == ReportStatus::PartiallyVerified {
                checks.degraded = true;
            }
        }
        None => {
            for name in [
                FIELDS_SUBSET,
                VALUE_CONSISTENCY,
                HOLDER_MATCHES_SUBJECT,
                NOT_EXPIRED,
                SOURCE_SUMMARY_CONSISTENT,
                SOURCE_VALID,
            ] {
                checks.record(name, false);
            }
        }
    }

    let summary = ReportSummary {
        kind: ArtifactKind::Presentation,
        credential_type: source.as_ref().and_then(|s| s.subtype().map(str::to_string)),
        issuer: source.as_ref().map(|s| s.issuer.clone()),
        holder: holder.map(str::to_string),
        issuance_date: source.as_ref().map(|s| s.issuance_date.to_iso8601()),
        expiration_date: source
            .as_ref()
            .and_then(|s| s.expiration_date.map(|t| t.to_iso8601())),
        source_credential_id: source_id.map(str::to_string),
    };
    let report = checks.finish(summary, "Presentation");
    tracing::debug!(
        status = ?report.status,
        failed = ?report.failed_checks(),
        "verified presentation"
    );
    Ok(report)
}

// ---------------------------------------------------------------------------
// Check bookkeeping
// ---------------------------------------------------------------------------

enum SignatureOutcome {
    Verified,
    /// Present and not a placeholder, but no key to check it with.
    Unchecked(String),
    Failed,
}

#[derive(Default)]
struct CheckSet {
    checks: BTreeMap<String, bool>,
    degraded: bool,
    unchecked_methods: Vec<String>,
}

impl CheckSet {
    fn record(&mut self, name: &str, ok: bool) {
        self.checks.insert(name.to_string(), ok);
    }

    fn record_signature(&mut self, name: &str, outcome: SignatureOutcome) {
        match outcome {
            SignatureOutcome::Verified => self.record(name, true),
            SignatureOutcome::Failed => self.record(name, false),
            SignatureOutcome::Unchecked(method) => {
                self.degraded = true;
                self.unchecked_methods.push(method);
                self.record(name, true);
            }
        }
    }

    fn finish(self, summary: ReportSummary, noun: &str) -> VerificationReport {
        let valid = self.checks.values().all(|ok| *ok);
        let (status, message) = if !valid {
            let failed: Vec<&str> = self
                .checks
                .iter()
                .filter(|(_, ok)| !**ok)
                .map(|(name, _)| name.as_str())
                .collect();
            (
                ReportStatus::Invalid,
                format!("{noun} verification failed: {}", failed.join(", ")),
            )
        } else if self.degraded {
            let detail = if self.unchecked_methods.is_empty() {
                "source credential signature not cryptographically verified".to_string()
            } else {
                format!("no key material for {}", self.unchecked_methods.join(", "))
            };
            (
                ReportStatus::PartiallyVerified,
                format!("{noun} structurally valid; signature not cryptographically verified ({detail})"),
            )
        } else {
            (ReportStatus::Valid, format!("{noun} verified successfully"))
        };
        VerificationReport {
            valid,
            status,
            checks: self.checks,
            message,
            summary,
        }
    }
}

fn check_signature(
    proof: Option<&Map<String, Value>>,
    signing_input: impl FnOnce() -> Result<CanonicalBytes, VcError>,
    keys: &dyn KeyResolver,
) -> SignatureOutcome {
    let Some(proof) = proof else {
        return SignatureOutcome::Failed;
    };
    let Some(proof_value) = str_member(proof, "proofValue") else {
        return SignatureOutcome::Failed;
    };
    if is_placeholder(proof_value) {
        return SignatureOutcome::Failed;
    }
    let Some(method) = str_member(proof, "verificationMethod") else {
        return SignatureOutcome::Failed;
    };
    let Some(key) = keys.resolve_key(method) else {
        tracing::warn!(method, "no key material; signature checked for presence only");
        return SignatureOutcome::Unchecked(method.to_string());
    };
    let input = match signing_input() {
        Ok(input) => input,
        Err(e) => {
            tracing::debug!(error = %e, "could not rebuild signing input");
            return SignatureOutcome::Failed;
        }
    };
    match verify_proof_value(&input, proof_value, &key) {
        Ok(()) => SignatureOutcome::Verified,
        Err(e) => {
            tracing::debug!(method, error = %e, "signature rejected");
            SignatureOutcome::Failed
        }
    }
}

// ---------------------------------------------------------------------------
// Field helpers
// ---------------------------------------------------------------------------

fn str_member<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    obj.get(key).and_then(Value::as_str)
}

fn timestamp_member(obj: &Map<String, Value>, key: &str) -> Option<Result<Timestamp, sdvc_core::CoreError>> {
    str_member(obj, key).map(Timestamp::parse_lenient)
}

/// `type` as a list of strings; a bare string counts as a one-element list.
fn type_list(candidate: &Value) -> Vec<&str> {
    match candidate.get("type") {
        Some(Value::String(s)) => vec![s.as_str()],
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    }
}

fn first_context_is_base(obj: &Map<String, Value>) -> bool {
    let context = obj.get("@context").or_else(|| obj.get("context"));
    match context {
        Some(Value::Array(items)) => items.first().and_then(Value::as_str) == Some(BASE_CONTEXT),
        Some(Value::String(s)) => s == BASE_CONTEXT,
        _ => false,
    }
}

/// The issuer as a string, or the `id` of an issuer object.
fn issuer_id(obj: &Map<String, Value>) -> Option<&str> {
    let issuer = match obj.get("issuer") {
        Some(Value::String(s)) => s.as_str(),
        Some(Value::Object(o)) => str_member(o, "id")?,
        _ => return None,
    };
    (!issuer.trim().is_empty()).then_some(issuer)
}

fn credential_subtype(candidate: &Value) -> Option<String> {
    let types = type_list(candidate);
    types
        .iter()
        .find(|t| **t != VC_TYPE)
        .or(types.first())
        .map(|t| t.to_string())
}

fn not_expired(obj: &Map<String, Value>, now: Timestamp) -> bool {
    match obj.get("expirationDate") {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => Timestamp::parse_lenient(s).is_ok_and(|exp| exp > now),
        Some(_) => false,
    }
}

/// Whether `did` is a DID and `verification_method` is a reference into it.
fn controls(did: Option<&str>, verification_method: Option<&str>) -> bool {
    let (Some(did), Some(method)) = (did, verification_method) else {
        return false;
    };
    let Ok(did) = Did::parse(did) else {
        return false;
    };
    split_method_reference(method).is_some() && did.is_referenced_by(method)
}

/// `disclosedFields` is a duplicate-free list of strings naming exactly the
/// keys of `disclosedData`.
fn disclosure_consistent(obj: &Map<String, Value>, disclosed: Option<&Map<String, Value>>) -> bool {
    let (Some(Value::Array(fields)), Some(disclosed)) = (obj.get("disclosedFields"), disclosed) else {
        return false;
    };
    let mut seen = BTreeSet::new();
    for field in fields {
        match field.as_str() {
            Some(name) if seen.insert(name) => {}
            _ => return false,
        }
    }
    seen.len() == disclosed.len() && disclosed.keys().all(|k| seen.contains(k.as_str()))
}

fn summary_consistent(summary: Option<&Value>, source: &Credential) -> bool {
    let summary = match summary {
        None | Some(Value::Null) => return true,
        Some(Value::Object(s)) => s,
        Some(_) => return false,
    };
    let types_match = match summary.get("type") {
        Some(Value::Array(items)) => {
            items.len() == source.credential_type.len()
                && items
                    .iter()
                    .zip(&source.credential_type)
                    .all(|(a, b)| a.as_str() == Some(b.as_str()))
        }
        _ => false,
    };
    str_member(summary, "id") == Some(source.id.as_str())
        && str_member(summary, "issuer") == Some(source.issuer.as_str())
        && types_match
        && timestamp_member(summary, "issuanceDate")
            .and_then(Result::ok)
            .is_some_and(|t| t == source.issuance_date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credential::{issue, issue_at, IssuanceRequest};
    use crate::presentation::disclose;
    use crate::resolve::NoKeyMaterial;
    use sdvc_crypto::{Ed25519KeyPair, Ed25519PublicKey, Ed25519Signer, PlaceholderSigner, Signer};
    use serde_json::json;

    const ISSUER: &str = "did:ethr:1:0x1111111111111111111111111111111111111111";
    const HOLDER: &str = "did:ethr:1:0x2222222222222222222222222222222222222222";

    struct Fixture {
        issuer: Ed25519Signer,
        holder: Ed25519Signer,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                issuer: Ed25519Signer::new(Ed25519KeyPair::generate(), format!("{ISSUER}#controller")),
                holder: Ed25519Signer::new(Ed25519KeyPair::generate(), format!("{HOLDER}#controller")),
            }
        }

        fn keys(&self) -> impl Fn(&str) -> Option<Ed25519PublicKey> + '_ {
            move |vm: &str| {
                if vm == self.issuer.verification_method() {
                    Some(self.issuer.public_key())
                } else if vm == self.holder.verification_method() {
                    Some(self.holder.public_key())
                } else {
                    None
                }
            }
        }

        fn request(&self) -> IssuanceRequest {
            IssuanceRequest {
                issuer: Did::parse(ISSUER).unwrap(),
                holder: Did::parse(HOLDER).unwrap(),
                credential_type: "IdentityCredential".into(),
                subject_claims: serde_json::from_value(json!({"name": "Alice", "idNumber": "X123"}))
                    .unwrap(),
                expiration_date: None,
                metadata: None,
            }
        }

        fn credential(&self) -> Credential {
            issue(self.request(), &self.issuer).unwrap()
        }
    }

    fn resolver_for(vc: &Credential) -> impl Fn(&str) -> Result<Option<Credential>, VcError> + '_ {
        move |id: &str| Ok((id == vc.id).then(|| vc.clone()))
    }

    #[test]
    fn signed_credential_is_valid() {
        let f = Fixture::new();
        let json = serde_json::to_value(f.credential()).unwrap();
        let report = verify_credential(&json, &f.keys()).unwrap();
        assert!(report.valid, "{report:?}");
        assert_eq!(report.status, ReportStatus::Valid);
        for name in [
            HAS_CONTEXT, HAS_TYPE, HAS_ISSUER, HAS_PROOF, HAS_ISSUANCE_DATE,
            SUBJECT_PRESENT, NOT_EXPIRED, ISSUER_VERIFIED, SIGNATURE_VALID,
        ] {
            assert_eq!(report.check(name), Some(true), "{name}");
        }
        assert_eq!(report.summary.kind, ArtifactKind::Credential);
        assert_eq!(report.summary.credential_type.as_deref(), Some("IdentityCredential"));
        assert_eq!(report.summary.holder.as_deref(), Some(HOLDER));
    }

    #[test]
    fn without_keys_credential_is_partially_verified() {
        let f = Fixture::new();
        let json = serde_json::to_value(f.credential()).unwrap();
        let report = verify_credential(&json, &NoKeyMaterial).unwrap();
        assert!(report.valid);
        assert_eq!(report.status, ReportStatus::PartiallyVerified);
        assert!(report.message.contains("#controller"));
    }

    #[test]
    fn placeholder_proof_is_never_valid() {
        let signer = PlaceholderSigner::credential(format!("{ISSUER}#controller"));
        let f = Fixture::new();
        let json = serde_json::to_value(issue(f.request(), &signer).unwrap()).unwrap();
        let fixture_keys = f.keys();
        let resolvers: [&dyn KeyResolver; 2] = [&NoKeyMaterial, &fixture_keys];
        for keys in resolvers {
            let report = verify_credential(&json, keys).unwrap();
            assert_eq!(report.check(SIGNATURE_VALID), Some(false));
            assert!(!report.valid);
            assert_eq!(report.status, ReportStatus::Invalid);
        }
    }

    #[test]
    fn empty_proof_value_fails() {
        let f = Fixture::new();
        let mut json = serde_json::to_value(f.credential()).unwrap();
        json["proof"]["proofValue"] = json!("");
        let report = verify_credential(&json, &NoKeyMaterial).unwrap();
        assert_eq!(report.check(SIGNATURE_VALID), Some(false));
    }

    #[test]
    fn tampered_claim_breaks_signature() {
        let f = Fixture::new();
        let mut json = serde_json::to_value(f.credential()).unwrap();
        json["credentialSubject"]["name"] = json!("Mallory");
        let report = verify_credential(&json, &f.keys()).unwrap();
        assert_eq!(report.check(SIGNATURE_VALID), Some(false));
        assert_eq!(report.failed_checks(), vec![SIGNATURE_VALID]);
        assert!(report.message.contains(SIGNATURE_VALID));
    }

    #[test]
    fn expired_credential_fails_not_expired() {
        let f = Fixture::new();
        let issued = Timestamp::now().checked_add_secs(-3 * 86_400).unwrap();
        let mut req = f.request();
        req.expiration_date = Timestamp::now().checked_add_secs(-86_400);
        let json = serde_json::to_value(issue_at(req, &f.issuer, issued).unwrap()).unwrap();
        let report = verify_credential(&json, &f.keys()).unwrap();
        assert_eq!(report.check(NOT_EXPIRED), Some(false));
        assert_eq!(report.check(SIGNATURE_VALID), Some(true));
        assert!(!report.valid);
    }

    #[test]
    fn structural_checks_all_run() {
        let report = verify_credential(&json!({}), &NoKeyMaterial).unwrap();
        assert!(!report.valid);
        assert_eq!(report.checks.len(), 9);
        assert_eq!(report.check(NOT_EXPIRED), Some(true));
        assert_eq!(report.check(HAS_CONTEXT), Some(false));
        assert_eq!(report.check(HAS_PROOF), Some(false));
    }

    #[test]
    fn non_object_is_malformed() {
        for bad in [json!([]), json!("vc"), json!(null), json!(3)] {
            assert!(matches!(
                verify_credential(&bad, &NoKeyMaterial),
                Err(VcError::MalformedInput(_))
            ));
        }
    }

    #[test]
    fn issuer_object_form_and_context_alias_are_accepted() {
        let f = Fixture::new();
        let mut json = serde_json::to_value(f.credential()).unwrap();
        json["issuer"] = json!({"id": ISSUER, "name": "Registry"});
        let ctx = json.as_object_mut().unwrap().remove("@context").unwrap();
        json["context"] = ctx;
        let report = verify_credential(&json, &NoKeyMaterial).unwrap();
        assert_eq!(report.check(HAS_ISSUER), Some(true));
        assert_eq!(report.check(HAS_CONTEXT), Some(true));
        assert_eq!(report.check(ISSUER_VERIFIED), Some(true));
    }

    #[test]
    fn proof_from_other_did_fails_issuer_verified() {
        let f = Fixture::new();
        let mut json = serde_json::to_value(f.credential()).unwrap();
        json["proof"]["verificationMethod"] = json!(format!("{HOLDER}#controller"));
        let report = verify_credential(&json, &f.keys()).unwrap();
        assert_eq!(report.check(ISSUER_VERIFIED), Some(false));
    }

    #[test]
    fn presentation_is_valid_against_its_source() {
        let f = Fixture::new();
        let vc = f.credential();
        let vp = serde_json::to_value(disclose(&vc, &["name"], &f.holder).unwrap()).unwrap();
        let report = verify_presentation(&vp, &resolver_for(&vc), &f.keys()).unwrap();
        assert!(report.valid, "{report:?}");
        assert_eq!(report.status, ReportStatus::Valid);
        assert_eq!(report.checks.len(), 15);
        assert_eq!(report.summary.kind, ArtifactKind::Presentation);
        assert_eq!(report.summary.source_credential_id.as_deref(), Some(vc.id.as_str()));
        assert_eq!(report.summary.issuer.as_deref(), Some(ISSUER));
    }

    #[test]
    fn verify_dispatches_on_type() {
        let f = Fixture::new();
        let vc = f.credential();
        let vp = serde_json::to_value(disclose(&vc, &["name"], &f.holder).unwrap()).unwrap();
        let resolver = resolver_for(&vc);
        let report = verify(&vp, &resolver, &f.keys()).unwrap();
        assert_eq!(report.summary.kind, ArtifactKind::Presentation);
        let report = verify(&serde_json::to_value(&vc).unwrap(), &resolver, &f.keys()).unwrap();
        assert_eq!(report.summary.kind, ArtifactKind::Credential);
    }

    #[test]
    fn mutated_disclosed_value_is_inconsistent() {
        let f = Fixture::new();
        let vc = f.credential();
        let mut vp = serde_json::to_value(disclose(&vc, &["name"], &f.holder).unwrap()).unwrap();
        vp["disclosedData"]["name"] = json!("Mallory");
        let report = verify_presentation(&vp, &resolver_for(&vc), &NoKeyMaterial).unwrap();
        assert_eq!(report.check(VALUE_CONSISTENCY), Some(false));
        assert!(!report.valid);
    }

    #[test]
    fn unresolvable_source_fails_source_checks() {
        let f = Fixture::new();
        let vc = f.credential();
        let vp = serde_json::to_value(disclose(&vc, &["name"], &f.holder).unwrap()).unwrap();
        let nothing = |_: &str| -> Result<Option<Credential>, VcError> { Ok(None) };
        let report = verify_presentation(&vp, &nothing, &f.keys()).unwrap();
        assert_eq!(report.check(SOURCE_RESOLVABLE), Some(false));
        assert_eq!(report.check(FIELDS_SUBSET), Some(false));
        assert_eq!(report.check(SIGNATURE_VALID), Some(true));
        assert!(!report.valid);
    }

    #[test]
    fn failed_source_lookup_is_an_error() {
        let f = Fixture::new();
        let vc = f.credential();
        let vp = serde_json::to_value(disclose(&vc, &["name"], &f.holder).unwrap()).unwrap();
        let broken = |_: &str| -> Result<Option<Credential>, VcError> {
            Err(VcError::Storage("wallet unreadable".into()))
        };
        let result = verify_presentation(&vp, &broken, &f.keys());
        assert!(matches!(result, Err(VcError::Storage(_))));
    }

    #[test]
    fn stored_legacy_credential_verifies_as_source() {
        let f = Fixture::new();
        let mut json = serde_json::to_value(f.credential()).unwrap();
        json["issuanceDate"] = json!("2026-01-15T12:00:00.250Z");
        json["metadata"] = json!({"ipfsHash": "QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG"});
        json["evidence"] = json!("verified in person");
        let input = crate::credential::signing_input_of(&json).unwrap();
        json["proof"]["proofValue"] = json!(f.issuer.sign(&input).unwrap().proof_value);
        assert!(verify_credential(&json, &f.keys()).unwrap().valid);

        let store = crate::store::InMemoryCredentialStore::new();
        let stored: Credential = serde_json::from_value(json).unwrap();
        crate::store::CredentialStore::put(&store, &stored).unwrap();

        let vp = serde_json::to_value(disclose(&stored, &["name"], &f.holder).unwrap()).unwrap();
        let report = verify_presentation(&vp, &store, &f.keys()).unwrap();
        assert_eq!(report.check(SOURCE_VALID), Some(true));
        assert_eq!(report.check(SOURCE_SUMMARY_CONSISTENT), Some(true));
        assert!(report.valid, "{report:?}");
    }

    #[test]
    fn edited_source_no_longer_verifies() {
        let f = Fixture::new();
        let json = serde_json::to_value(f.credential()).unwrap();
        let mut vc: Credential = serde_json::from_value(json).unwrap();
        vc.credential_subject.claims.insert("name".into(), json!("Mallory"));
        let vp = serde_json::to_value(disclose(&vc, &["name"], &f.holder).unwrap()).unwrap();
        let report = verify_presentation(&vp, &resolver_for(&vc), &f.keys()).unwrap();
        assert_eq!(report.check(VALUE_CONSISTENCY), Some(true));
        assert_eq!(report.check(SOURCE_VALID), Some(false));
    }

    #[test]
    fn presentation_of_forged_source_is_invalid() {
        let f = Fixture::new();
        let forged = issue(
            f.request(),
            &Ed25519Signer::new(Ed25519KeyPair::generate(), format!("{ISSUER}#controller")),
        )
        .unwrap();
        let vp = serde_json::to_value(disclose(&forged, &["name"], &f.holder).unwrap()).unwrap();
        let report = verify_presentation(&vp, &resolver_for(&forged), &f.keys()).unwrap();
        assert_eq!(report.check(SOURCE_VALID), Some(false));
        assert_eq!(report.check(VALUE_CONSISTENCY), Some(true));
        assert!(!report.valid);
    }

    #[test]
    fn disclosure_field_list_must_match_data() {
        let f = Fixture::new();
        let vc = f.credential();
        let mut vp = serde_json::to_value(disclose(&vc, &["name"], &f.holder).unwrap()).unwrap();
        vp["disclosedFields"] = json!(["name", "idNumber"]);
        let report = verify_presentation(&vp, &resolver_for(&vc), &NoKeyMaterial).unwrap();
        assert_eq!(report.check(DISCLOSURE_CONSISTENT), Some(false));
    }

    #[test]
    fn summary_must_match_source() {
        let f = Fixture::new();
        let vc = f.credential();
        let mut vp = serde_json::to_value(disclose(&vc, &["name"], &f.holder).unwrap()).unwrap();
        vp["verifiableCredential"]["issuer"] = json!("did:web:elsewhere.example");
        let report = verify_presentation(&vp, &resolver_for(&vc), &NoKeyMaterial).unwrap();
        assert_eq!(report.check(SOURCE_SUMMARY_CONSISTENT), Some(false));
    }

    #[test]
    fn placeholder_presentation_is_invalid() {
        let f = Fixture::new();
        let vc = f.credential();
        let signer = PlaceholderSigner::disclosure(format!("{HOLDER}#controller"));
        let vp = serde_json::to_value(disclose(&vc, &["name"], &signer).unwrap()).unwrap();
        let report = verify_presentation(&vp, &resolver_for(&vc), &f.keys()).unwrap();
        assert_eq!(report.check(SIGNATURE_VALID), Some(false));
        assert!(!report.valid);
    }

    #[test]
    fn degraded_source_propagates_partial_status() {
        let f = Fixture::new();
        let vc = f.credential();
        let vp = serde_json::to_value(disclose(&vc, &["name"], &f.holder).unwrap()).unwrap();
        let holder_only = |vm: &str| (vm == f.holder.verification_method()).then(|| f.holder.public_key());
        let report = verify_presentation(&vp, &resolver_for(&vc), &holder_only).unwrap();
        assert!(report.valid);
        assert_eq!(report.status, ReportStatus::PartiallyVerified);
    }

    #[test]
    fn report_serializes_camel_case() {
        let f = Fixture::new();
        let json = serde_json::to_value(f.credential()).unwrap();
        let report = verify_credential(&json, &NoKeyMaterial).unwrap();
        let out = serde_json::to_value(&report).unwrap();
        assert_eq!(out["status"], "partiallyVerified");
        assert_eq!(out["summary"]["kind"], "credential");
        assert_eq!(out["summary"]["credentialType"], "IdentityCredential");
        assert!(out["checks"]["signatureValid"].as_bool().unwrap());
    }
}
