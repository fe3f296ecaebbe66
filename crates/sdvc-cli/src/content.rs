//! `sdvc content`: store and fetch attachments by digest.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Subcommand;

use sdvc_core::ContentDigest;
use sdvc_crypto::{ContentStore, FsContentStore};

#[derive(Subcommand, Debug)]
pub enum ContentCommand {
    /// Store a file and print its digest.
    Put {
        /// Content directory.
        #[arg(long, value_name = "DIR")]
        dir: PathBuf,
        file: PathBuf,
    },
    /// Fetch a blob by digest.
    Get {
        /// Content directory.
        #[arg(long, value_name = "DIR")]
        dir: PathBuf,
        /// `sha256:<hex>` digest.
        digest: String,
        /// Write the blob here; defaults to stdout.
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
}

pub fn run_content(cmd: &ContentCommand) -> Result<u8> {
    match cmd {
        ContentCommand::Put { dir, file } => {
            let bytes =
                std::fs::read(file).with_context(|| format!("failed to read {}", file.display()))?;
            let digest = FsContentStore::new(dir.clone()).store(&bytes)?;
            println!("{digest}");
            Ok(0)
        }
        ContentCommand::Get { dir, digest, out } => {
            let digest: ContentDigest = digest.parse().context("invalid digest")?;
            let Some(bytes) = FsContentStore::new(dir.clone()).fetch(&digest)? else {
                tracing::error!(%digest, "content not found");
                return Ok(1);
            };
            match out {
                Some(path) => std::fs::write(path, &bytes)
                    .with_context(|| format!("failed to write {}", path.display()))?,
                None => {
                    use std::io::Write;
                    std::io::stdout()
                        .write_all(&bytes)
                        .context("failed to write to stdout")?;
                }
            }
            Ok(0)
        }
    }
}
