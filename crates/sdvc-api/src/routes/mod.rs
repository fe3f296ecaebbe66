//! # API Route Modules
//!
//! - `dids`: DID derivation with custodial keys, and resolution.
//! - `credentials`: issuance into the holder's wallet, listing, revocation.
//! - `presentations`: selective disclosure signed by the holder.
//! - `verify`: verification of either artifact.
//!
//! Handlers that touch the wallet run that work through [`blocking`]: a
//! file-backed wallet reads and writes synchronously.

pub mod credentials;
pub mod dids;
pub mod presentations;
pub mod verify;

use crate::error::AppError;

/// Run synchronous wallet work on tokio's blocking pool.
pub(crate) async fn blocking<T, F>(work: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AppError::Internal(format!("wallet task failed: {e}")))?
}
