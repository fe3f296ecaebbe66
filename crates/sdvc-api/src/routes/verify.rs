//! # Verification
//!
//! `POST /v1/verify` accepts a credential or a disclosure presentation and
//! returns the verification report. A failed verification is a `200` with
//! `valid: false`; only a body that is not a JSON object is an error.
//!
//! Keys resolve through the DID registry. Presentations are checked
//! against the source credential held in the wallet; a wallet that cannot
//! be read is a `500`, not an invalid report.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};

use sdvc_vc::{verify, VerificationReport};

use crate::error::AppError;
use crate::extractors::extract_json;
use crate::routes::blocking;
use crate::state::{AppState, Wallet};

pub fn router() -> Router<AppState> {
    Router::new().route("/v1/verify", post(verify_artifact))
}

/// POST /v1/verify
#[utoipa::path(
    post,
    path = "/v1/verify",
    request_body = serde_json::Value,
    responses(
        (status = 200, description = "Verification report", body = serde_json::Value),
        (status = 400, description = "Body is not a JSON object", body = crate::error::ErrorBody),
        (status = 500, description = "Wallet could not be read", body = crate::error::ErrorBody),
    ),
    tag = "verification"
)]
pub(crate) async fn verify_artifact(
    State(state): State<AppState>,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Json<VerificationReport>, AppError> {
    let candidate = extract_json(body)?;
    let report = blocking(move || {
        Ok(verify(&candidate, state.wallet.as_resolver(), &state.registry)?)
    })
    .await?;
    Ok(Json(report))
}
