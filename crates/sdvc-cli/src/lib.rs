//! # sdvc-cli: Command-Line Tool
//!
//! The `sdvc` binary works on local files: keys, DID documents, credential
//! JSON, a wallet directory and a content directory. Nothing talks to a
//! network.
//!
//! ## Subcommands
//!
//! - `sdvc keygen`: Ed25519 key pair as hex files.
//! - `sdvc did`: derive a DID and print its document.
//! - `sdvc issue`: sign a credential, optionally filing it in a wallet.
//! - `sdvc disclose`: derive a signed partial disclosure.
//! - `sdvc verify`: check either artifact; the exit code is the verdict.
//! - `sdvc wallet list|revoke`: manage a wallet directory.
//! - `sdvc content put|get`: content-addressed attachments.
//!
//! ```bash
//! sdvc keygen --prefix issuer
//! sdvc did --address 0x1111111111111111111111111111111111111111 --pubkey issuer.pub
//! sdvc issue --issuer did:ethr:1:0x1111... --holder did:ethr:1:0x2222... \
//!     --type IdentityCredential --claims claims.json --key issuer.key
//! ```

pub mod content;
pub mod disclose;
pub mod issue;
pub mod keys;
pub mod verify;
pub mod wallet;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use serde::Serialize;
use zeroize::Zeroizing;

use sdvc_crypto::{Ed25519Signer, EnvSigner, Signer};

/// Where the signing key comes from. Exactly one source is required.
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct KeySource {
    /// File holding the 64-hex-character Ed25519 seed (from `sdvc keygen`).
    #[arg(long, value_name = "FILE")]
    pub key: Option<PathBuf>,
    /// Environment variable holding the seed.
    #[arg(long, value_name = "VAR")]
    pub key_env: Option<String>,
}

impl KeySource {
    /// Build a signer bound to `verification_method`.
    pub fn load(&self, verification_method: String) -> Result<Box<dyn Signer>> {
        match (&self.key, &self.key_env) {
            (Some(path), _) => {
                let seed = Zeroizing::new(
                    std::fs::read_to_string(path)
                        .with_context(|| format!("failed to read key file: {}", path.display()))?,
                );
                let signer = Ed25519Signer::from_seed_hex(seed.trim(), verification_method)
                    .with_context(|| format!("invalid key file: {}", path.display()))?;
                Ok(Box::new(signer))
            }
            (None, Some(var)) => Ok(Box::new(EnvSigner::from_env(var, verification_method)?)),
            (None, None) => bail!("one of --key or --key-env is required"),
        }
    }
}

/// Read and parse a JSON file.
pub fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("failed to parse JSON: {}", path.display()))
}

/// Pretty-print `value` to `out`, or to stdout when `out` is `None`.
pub fn write_json<T: Serialize>(value: &T, out: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    match out {
        Some(path) => {
            std::fs::write(path, format!("{json}\n"))
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), "wrote output");
        }
        None => println!("{json}"),
    }
    Ok(())
}
