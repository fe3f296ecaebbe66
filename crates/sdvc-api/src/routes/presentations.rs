//! # Selective Disclosure
//!
//! `POST /v1/presentations` derives a presentation from a credential in
//! the wallet, revealing only the requested claims, and signs it with the
//! holder's custodial key.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use utoipa::ToSchema;

use sdvc_vc::{disclose, CredentialStore, DisclosurePresentation};

use crate::error::AppError;
use crate::extractors::{extract_validated_json, require_non_empty, Validate};
use crate::routes::blocking;
use crate::state::AppState;

/// Request body for a disclosure.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DiscloseRequest {
    /// Id of a credential in the wallet.
    pub credential_id: String,
    /// Claim names to reveal. Order is irrelevant; duplicates collapse.
    pub fields: Vec<String>,
}

impl Validate for DiscloseRequest {
    fn validate(&self) -> Result<(), String> {
        require_non_empty("credentialId", &self.credential_id)?;
        if self.fields.is_empty() {
            return Err("fields must name at least one claim".into());
        }
        Ok(())
    }
}

pub fn router() -> Router<AppState> {
    Router::new().route("/v1/presentations", post(create_presentation))
}

/// POST /v1/presentations
#[utoipa::path(
    post,
    path = "/v1/presentations",
    request_body = DiscloseRequest,
    responses(
        (status = 201, description = "Signed disclosure presentation", body = serde_json::Value),
        (status = 404, description = "Credential not in the wallet", body = crate::error::ErrorBody),
        (status = 422, description = "Unknown field, or no custodial key for the holder", body = crate::error::ErrorBody),
    ),
    tag = "presentations"
)]
pub(crate) async fn create_presentation(
    State(state): State<AppState>,
    body: Result<Json<DiscloseRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<DisclosurePresentation>), AppError> {
    let req = extract_validated_json(body)?;
    let wallet = Arc::clone(&state.wallet);
    let id = req.credential_id.clone();
    let credential = blocking(move || {
        wallet
            .get(&id)?
            .ok_or_else(|| AppError::NotFound(format!("credential {id} not found")))
    })
    .await?;
    let signer = state.keyring.get(credential.holder()).ok_or_else(|| {
        AppError::Validation(format!("no custodial key for holder {}", credential.holder()))
    })?;

    let presentation = disclose(&credential, req.fields.as_slice(), &*signer)?;
    tracing::info!(
        source = %credential.id,
        fields = presentation.disclosed_fields.len(),
        "disclosure created"
    );
    Ok((StatusCode::CREATED, Json(presentation)))
}
