//! # Issue Subcommand
//!
//! Signs a credential for a holder from a JSON claims file. The signing key
//! must belong to the issuer: it is bound to `<issuer>#controller`.
//!
//! With `--attach`, the file is put in the content directory and the
//! credential's metadata records its digest. With `--wallet`, the
//! credential is also filed in the holder's wallet.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use sdvc_core::{Did, Timestamp};
use sdvc_crypto::{ContentStore, FsContentStore};
use sdvc_vc::{issue, CredentialMetadata, CredentialStore, FileCredentialStore, IssuanceRequest};

use crate::KeySource;

/// Arguments for `sdvc issue`.
#[derive(Args, Debug)]
pub struct IssueArgs {
    /// Issuer DID.
    #[arg(long)]
    pub issuer: String,
    /// Holder DID.
    #[arg(long)]
    pub holder: String,
    /// Credential subtype, e.g. `IdentityCredential`.
    #[arg(long = "type", value_name = "TYPE")]
    pub credential_type: String,
    /// JSON object of claims about the holder.
    #[arg(long, value_name = "FILE")]
    pub claims: PathBuf,
    /// Expiry as RFC 3339 UTC, e.g. `2030-01-01T00:00:00Z`.
    #[arg(long, value_name = "TIMESTAMP")]
    pub expires: Option<String>,
    /// Document to attach by content digest.
    #[arg(long, value_name = "FILE", requires = "content_dir")]
    pub attach: Option<PathBuf>,
    /// Content directory for `--attach`.
    #[arg(long, value_name = "DIR")]
    pub content_dir: Option<PathBuf>,
    /// Wallet directory to file the credential in.
    #[arg(long, value_name = "DIR")]
    pub wallet: Option<PathBuf>,
    /// Write the credential here instead of stdout.
    #[arg(long, value_name = "FILE")]
    pub out: Option<PathBuf>,
    #[command(flatten)]
    pub key: KeySource,
}

pub fn run_issue(args: &IssueArgs) -> Result<u8> {
    let issuer = Did::parse(&args.issuer).context("invalid --issuer")?;
    let holder = Did::parse(&args.holder).context("invalid --holder")?;
    let subject_claims: BTreeMap<String, serde_json::Value> = crate::read_json(&args.claims)
        .with_context(|| format!("{} must hold a JSON object of claims", args.claims.display()))?;
    let expiration_date = args
        .expires
        .as_deref()
        .map(Timestamp::parse)
        .transpose()
        .context("invalid --expires")?;
    let metadata = match (&args.attach, &args.content_dir) {
        (Some(file), Some(dir)) => Some(attach(file, dir)?),
        _ => None,
    };

    let signer = args.key.load(issuer.controller_reference())?;
    let credential = issue(
        IssuanceRequest {
            issuer,
            holder,
            credential_type: args.credential_type.clone(),
            subject_claims,
            expiration_date,
            metadata,
        },
        &*signer,
    )?;

    if let Some(dir) = &args.wallet {
        FileCredentialStore::new(dir.clone())
            .put(&credential)
            .with_context(|| format!("failed to file credential in {}", dir.display()))?;
        tracing::info!(id = %credential.id, wallet = %dir.display(), "credential stored");
    }
    crate::write_json(&credential, args.out.as_deref())?;
    Ok(0)
}

fn attach(file: &std::path::Path, content_dir: &std::path::Path) -> Result<CredentialMetadata> {
    let bytes =
        std::fs::read(file).with_context(|| format!("failed to read {}", file.display()))?;
    let digest = FsContentStore::new(content_dir).store(&bytes)?;
    let mut metadata = CredentialMetadata::for_digest(&digest);
    metadata.file_name = file
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string);
    Ok(metadata)
}
