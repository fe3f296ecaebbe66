//! # Keys and DIDs
//!
//! `sdvc keygen` writes an Ed25519 key pair as hex files; `sdvc did`
//! derives a `did:ethr` identifier for an account address and prints its
//! document. A document built from `--pubkey` publishes the Ed25519 key so
//! verifiers can check signatures; without it the document only names the
//! recovery method and signatures cannot be checked.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use sdvc_core::{build_document, derive_did, KeyDescriptor};
use sdvc_crypto::{Ed25519KeyPair, Ed25519PublicKey};

/// Arguments for `sdvc keygen`.
#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// Output directory for the key files.
    #[arg(long, short, default_value = ".")]
    pub output: PathBuf,
    /// File name prefix: writes `<prefix>.key` and `<prefix>.pub`.
    #[arg(long, default_value = "sdvc")]
    pub prefix: String,
}

/// Arguments for `sdvc did`.
#[derive(Args, Debug)]
pub struct DidArgs {
    /// Controller account address (`0x` + 40 hex digits).
    #[arg(long)]
    pub address: String,
    /// Chain reference.
    #[arg(long, default_value = "1")]
    pub chain: String,
    /// Ed25519 public key file (from `sdvc keygen`).
    #[arg(long, value_name = "FILE")]
    pub pubkey: Option<PathBuf>,
    /// Write the document here instead of stdout.
    #[arg(long, value_name = "FILE")]
    pub out: Option<PathBuf>,
}

pub fn run_keygen(args: &KeygenArgs) -> Result<u8> {
    cmd_keygen(&args.output, &args.prefix)
}

pub fn run_did(args: &DidArgs) -> Result<u8> {
    let descriptor = match &args.pubkey {
        Some(path) => {
            let hex = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read public key: {}", path.display()))?;
            let key = Ed25519PublicKey::from_hex(hex.trim())
                .with_context(|| format!("invalid public key: {}", path.display()))?;
            KeyDescriptor::ed25519(key.to_hex())
        }
        None => {
            tracing::warn!("no --pubkey given; the document will not publish a verification key");
            KeyDescriptor::secp256k1_recovery()
        }
    };
    let did = derive_did(&args.address, &args.chain, &descriptor)?;
    let document = build_document(&did, &descriptor)?;
    crate::write_json(&document, args.out.as_deref())?;
    Ok(0)
}

/// Generate a new Ed25519 key pair and write it to files.
fn cmd_keygen(output_dir: &Path, prefix: &str) -> Result<u8> {
    std::fs::create_dir_all(output_dir).with_context(|| {
        format!(
            "failed to create output directory: {}",
            output_dir.display()
        )
    })?;

    let key = Ed25519KeyPair::generate();
    let public_hex = key.public_key().to_hex();

    let key_path = output_dir.join(format!("{prefix}.key"));
    let pub_path = output_dir.join(format!("{prefix}.pub"));

    std::fs::write(&key_path, key.seed_hex().as_bytes())
        .with_context(|| format!("failed to write private key: {}", key_path.display()))?;
    std::fs::write(&pub_path, &public_hex)
        .with_context(|| format!("failed to write public key: {}", pub_path.display()))?;

    println!("OK: generated Ed25519 keypair");
    println!("  Private key: {}", key_path.display());
    println!("  Public key:  {}", pub_path.display());
    println!("  Public key (hex): {public_hex}");

    Ok(0)
}
