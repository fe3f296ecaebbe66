//! `sdvc wallet`: list and revoke credentials in a wallet directory.

use std::path::PathBuf;

use anyhow::Result;
use clap::Subcommand;

use sdvc_vc::{CredentialStore, FileCredentialStore};

#[derive(Subcommand, Debug)]
pub enum WalletCommand {
    /// Print a holder's credentials, oldest first.
    List {
        /// Wallet directory.
        #[arg(long, value_name = "DIR")]
        dir: PathBuf,
        /// Holder DID.
        #[arg(long)]
        holder: String,
    },
    /// Delete a credential. Presentations derived from it stop verifying.
    Revoke {
        /// Wallet directory.
        #[arg(long, value_name = "DIR")]
        dir: PathBuf,
        /// Credential id.
        id: String,
    },
}

pub fn run_wallet(cmd: &WalletCommand) -> Result<u8> {
    match cmd {
        WalletCommand::List { dir, holder } => {
            let credentials = FileCredentialStore::new(dir.clone()).list_for_holder(holder)?;
            tracing::info!(holder = %holder, count = credentials.len(), "wallet listed");
            crate::write_json(&credentials, None)?;
            Ok(0)
        }
        WalletCommand::Revoke { dir, id } => {
            if FileCredentialStore::new(dir.clone()).remove(id)? {
                println!("OK: revoked {id}");
                Ok(0)
            } else {
                tracing::error!(id = %id, wallet = %dir.display(), "credential not found");
                Ok(1)
            }
        }
    }
}
