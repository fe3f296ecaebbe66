//! `sdvc disclose`: derive a holder-signed presentation of chosen fields.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;

use sdvc_core::Did;
use sdvc_vc::{disclose, Credential, CredentialStore, FileCredentialStore};

use crate::KeySource;

/// Arguments for `sdvc disclose`.
#[derive(Args, Debug)]
pub struct DiscloseArgs {
    /// Credential JSON file.
    #[arg(long, value_name = "FILE", conflicts_with_all = ["wallet", "id"])]
    pub credential: Option<PathBuf>,
    /// Wallet directory to take the credential from (with `--id`).
    #[arg(long, value_name = "DIR", requires = "id")]
    pub wallet: Option<PathBuf>,
    /// Credential id inside `--wallet`.
    #[arg(long, requires = "wallet")]
    pub id: Option<String>,
    /// Claims to reveal, comma separated or repeated.
    #[arg(long, value_delimiter = ',', required = true)]
    pub fields: Vec<String>,
    /// Write the presentation here instead of stdout.
    #[arg(long, value_name = "FILE")]
    pub out: Option<PathBuf>,
    #[command(flatten)]
    pub key: KeySource,
}

pub fn run_disclose(args: &DiscloseArgs) -> Result<u8> {
    let credential = load_credential(args)?;
    let holder = Did::parse(credential.holder()).context("credential subject is not a DID")?;
    let signer = args.key.load(holder.controller_reference())?;

    let presentation = disclose(&credential, args.fields.as_slice(), &*signer)?;
    tracing::info!(
        credential = %credential.id,
        fields = presentation.disclosed_fields.len(),
        "presentation created"
    );
    crate::write_json(&presentation, args.out.as_deref())?;
    Ok(0)
}

fn load_credential(args: &DiscloseArgs) -> Result<Credential> {
    match (&args.credential, &args.wallet, &args.id) {
        (Some(path), _, _) => crate::read_json(path),
        (None, Some(dir), Some(id)) => FileCredentialStore::new(dir.clone())
            .get(id)?
            .with_context(|| format!("credential {id} not found in {}", dir.display())),
        _ => bail!("give --credential FILE or --wallet DIR --id ID"),
    }
}
