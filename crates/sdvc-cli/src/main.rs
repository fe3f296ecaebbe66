//! # sdvc CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.
//! Logs go to stderr so stdout carries only JSON and digests.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use sdvc_cli::content::{run_content, ContentCommand};
use sdvc_cli::disclose::{run_disclose, DiscloseArgs};
use sdvc_cli::issue::{run_issue, IssueArgs};
use sdvc_cli::keys::{run_did, run_keygen, DidArgs, KeygenArgs};
use sdvc_cli::verify::{run_verify, VerifyArgs};
use sdvc_cli::wallet::{run_wallet, WalletCommand};

/// Verifiable Credentials with selective disclosure.
///
/// Derives DIDs, issues Ed25519-signed credentials, discloses chosen
/// claims as holder-signed presentations, and verifies both.
#[derive(Parser, Debug)]
#[command(name = "sdvc", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate an Ed25519 key pair.
    Keygen(KeygenArgs),

    /// Derive a DID for an account address and print its document.
    Did(DidArgs),

    /// Issue a signed credential.
    Issue(IssueArgs),

    /// Disclose chosen claims of a credential.
    Disclose(DiscloseArgs),

    /// Verify a credential or presentation.
    Verify(VerifyArgs),

    /// Wallet directory operations.
    #[command(subcommand)]
    Wallet(WalletCommand),

    /// Content-addressed attachment storage.
    #[command(subcommand)]
    Content(ContentCommand),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match &cli.command {
        Commands::Keygen(args) => run_keygen(args),
        Commands::Did(args) => run_did(args),
        Commands::Issue(args) => run_issue(args),
        Commands::Disclose(args) => run_disclose(args),
        Commands::Verify(args) => run_verify(args),
        Commands::Wallet(cmd) => run_wallet(cmd),
        Commands::Content(cmd) => run_content(cmd),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
