//! # Verify Subcommand
//!
//! Checks a credential or presentation file and prints the report. Keys
//! come from DID documents passed with `--did-doc`; a presentation's source
//! credential comes from `--wallet`.
//!
//! Exit codes: 0 valid, 2 partially verified (a signature could not be
//! checked for lack of a key), 1 invalid or error.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use sdvc_core::DidDocument;
use sdvc_vc::{verify, Credential, DidRegistry, FileCredentialStore, ReportStatus, VcError};

/// Arguments for `sdvc verify`.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Credential or presentation JSON file.
    pub artifact: PathBuf,
    /// DID document supplying a verification key. Repeatable.
    #[arg(long = "did-doc", value_name = "FILE")]
    pub did_docs: Vec<PathBuf>,
    /// Wallet directory holding source credentials.
    #[arg(long, value_name = "DIR")]
    pub wallet: Option<PathBuf>,
}

pub fn run_verify(args: &VerifyArgs) -> Result<u8> {
    let candidate: serde_json::Value = crate::read_json(&args.artifact)?;

    let registry = DidRegistry::new();
    for path in &args.did_docs {
        let document: DidDocument = crate::read_json(path)?;
        registry
            .register(document)
            .with_context(|| format!("rejected DID document: {}", path.display()))?;
    }

    let report = match &args.wallet {
        Some(dir) => verify(&candidate, &FileCredentialStore::new(dir.clone()), &registry)?,
        None => verify(&candidate, &no_credentials, &registry)?,
    };
    crate::write_json(&report, None)?;

    let code = match report.status {
        ReportStatus::Valid => 0,
        ReportStatus::PartiallyVerified => {
            tracing::warn!("{}", report.message);
            2
        }
        ReportStatus::Invalid => {
            tracing::error!(failed = ?report.failed_checks(), "{}", report.message);
            1
        }
    };
    Ok(code)
}

fn no_credentials(_: &str) -> Result<Option<Credential>, VcError> {
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::path::Path;

    use sdvc_core::{build_document, Did, KeyDescriptor};
    use sdvc_crypto::{Ed25519KeyPair, Ed25519Signer};
    use sdvc_vc::{disclose, issue, CredentialStore, IssuanceRequest};

    const ISSUER: &str = "did:ethr:1:0x1111111111111111111111111111111111111111";
    const HOLDER: &str = "did:ethr:1:0x2222222222222222222222222222222222222222";

    fn signer_and_doc(did: &str, dir: &Path, name: &str) -> (Ed25519Signer, PathBuf) {
        let did = Did::parse(did).unwrap();
        let key = Ed25519KeyPair::generate();
        let descriptor = KeyDescriptor::ed25519(key.public_key().to_hex());
        let path = dir.join(format!("{name}.did.json"));
        crate::write_json(&build_document(&did, &descriptor).unwrap(), Some(&path)).unwrap();
        (Ed25519Signer::new(key, did.controller_reference()), path)
    }

    fn credential(signer: &Ed25519Signer) -> Credential {
        let mut claims = BTreeMap::new();
        claims.insert("name".to_string(), serde_json::json!("Alice"));
        claims.insert("country".to_string(), serde_json::json!("NL"));
        issue(
            IssuanceRequest {
                issuer: Did::parse(ISSUER).unwrap(),
                holder: Did::parse(HOLDER).unwrap(),
                credential_type: "IdentityCredential".into(),
                subject_claims: claims,
                expiration_date: None,
                metadata: None,
            },
            signer,
        )
        .unwrap()
    }

    fn args(artifact: PathBuf, did_docs: Vec<PathBuf>, wallet: Option<PathBuf>) -> VerifyArgs {
        VerifyArgs {
            artifact,
            did_docs,
            wallet,
        }
    }

    #[test]
    fn valid_credential_exits_zero() {
        let dir = tempfile::tempdir().unwrap();
        let (issuer, issuer_doc) = signer_and_doc(ISSUER, dir.path(), "issuer");
        let vc_path = dir.path().join("vc.json");
        crate::write_json(&credential(&issuer), Some(&vc_path)).unwrap();

        assert_eq!(run_verify(&args(vc_path, vec![issuer_doc], None)).unwrap(), 0);
    }

    #[test]
    fn missing_key_exits_two() {
        let dir = tempfile::tempdir().unwrap();
        let (issuer, _) = signer_and_doc(ISSUER, dir.path(), "issuer");
        let vc_path = dir.path().join("vc.json");
        crate::write_json(&credential(&issuer), Some(&vc_path)).unwrap();

        assert_eq!(run_verify(&args(vc_path, vec![], None)).unwrap(), 2);
    }

    #[test]
    fn tampered_credential_exits_one() {
        let dir = tempfile::tempdir().unwrap();
        let (issuer, issuer_doc) = signer_and_doc(ISSUER, dir.path(), "issuer");
        let mut vc = serde_json::to_value(credential(&issuer)).unwrap();
        vc["credentialSubject"]["country"] = serde_json::json!("DE");
        let vc_path = dir.path().join("vc.json");
        crate::write_json(&vc, Some(&vc_path)).unwrap();

        assert_eq!(run_verify(&args(vc_path, vec![issuer_doc], None)).unwrap(), 1);
    }

    #[test]
    fn presentation_needs_the_wallet() {
        let dir = tempfile::tempdir().unwrap();
        let (issuer, issuer_doc) = signer_and_doc(ISSUER, dir.path(), "issuer");
        let (holder, holder_doc) = signer_and_doc(HOLDER, dir.path(), "holder");
        let vc = credential(&issuer);
        let wallet_dir = dir.path().join("wallet");
        FileCredentialStore::new(wallet_dir.clone()).put(&vc).unwrap();

        let vp = disclose(&vc, &["country"], &holder).unwrap();
        let vp_path = dir.path().join("vp.json");
        crate::write_json(&vp, Some(&vp_path)).unwrap();
        let docs = vec![issuer_doc, holder_doc];

        let with_wallet = args(vp_path.clone(), docs.clone(), Some(wallet_dir));
        assert_eq!(run_verify(&with_wallet).unwrap(), 0);
        assert_eq!(run_verify(&args(vp_path, docs, None)).unwrap(), 1);
    }

    #[test]
    fn unreadable_wallet_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let (issuer, issuer_doc) = signer_and_doc(ISSUER, dir.path(), "issuer");
        let (holder, holder_doc) = signer_and_doc(HOLDER, dir.path(), "holder");
        let vc = credential(&issuer);
        let wallet_dir = dir.path().join("wallet");
        FileCredentialStore::new(wallet_dir.clone()).put(&vc).unwrap();
        std::fs::write(wallet_dir.join("credentials_a.json"), "not json").unwrap();

        let vp_path = dir.path().join("vp.json");
        crate::write_json(&disclose(&vc, &["name"], &holder).unwrap(), Some(&vp_path)).unwrap();

        let result = run_verify(&args(vp_path, vec![issuer_doc, holder_doc], Some(wallet_dir)));
        assert!(result.is_err());
    }

    #[test]
    fn non_json_artifact_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("junk.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(run_verify(&args(path, vec![], None)).is_err());
    }
}
