//! # Credential Issuance and Wallet
//!
//! Issuance signs with the issuer's custodial key and files the result in
//! the holder's wallet. Revocation is removal from the wallet: a revoked
//! credential can no longer back a presentation.
//!
//! ## Endpoints
//!
//! - `POST /v1/credentials`: issue and store.
//! - `GET /v1/credentials?holder=<did>`: the holder's credentials, oldest
//!   first.
//! - `GET /v1/credentials/{id}`: fetch one.
//! - `DELETE /v1/credentials/{id}`: revoke.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use sdvc_core::{Did, Timestamp};
use sdvc_vc::{issue, Credential, CredentialMetadata, CredentialStore, IssuanceRequest};

use crate::error::AppError;
use crate::extractors::{extract_validated_json, require_non_empty, Validate};
use crate::routes::blocking;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for credential issuance.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IssueCredentialRequest {
    /// Issuer DID. Must have a custodial key on this service.
    pub issuer: String,
    /// Holder DID, becomes `credentialSubject.id`.
    pub holder: String,
    /// Subtype such as `IdentityCredential`.
    pub credential_type: String,
    /// Claims about the holder. Numbers must be integers.
    #[schema(value_type = Object)]
    pub subject_claims: BTreeMap<String, serde_json::Value>,
    /// RFC 3339 UTC (`Z`) expiry.
    #[serde(default)]
    pub expiration_date: Option<String>,
    #[serde(default)]
    pub metadata: Option<MetadataInput>,
}

/// Reference to the document a credential attests.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MetadataInput {
    pub content_hash: String,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub file_type: Option<String>,
}

impl Validate for IssueCredentialRequest {
    fn validate(&self) -> Result<(), String> {
        require_non_empty("issuer", &self.issuer)?;
        require_non_empty("holder", &self.holder)?;
        require_non_empty("credentialType", &self.credential_type)?;
        if self.subject_claims.contains_key("id") {
            return Err("subjectClaims must not contain \"id\"; the holder is the subject".into());
        }
        if let Some(metadata) = &self.metadata {
            require_non_empty("metadata.contentHash", &metadata.content_hash)?;
        }
        Ok(())
    }
}

impl IssueCredentialRequest {
    fn into_issuance(self) -> Result<IssuanceRequest, AppError> {
        let expiration_date = self
            .expiration_date
            .as_deref()
            .map(Timestamp::parse)
            .transpose()?;
        Ok(IssuanceRequest {
            issuer: Did::parse(&self.issuer)?,
            holder: Did::parse(&self.holder)?,
            credential_type: self.credential_type,
            subject_claims: self.subject_claims,
            expiration_date,
            metadata: self.metadata.map(|m| CredentialMetadata {
                content_hash: m.content_hash,
                file_name: m.file_name,
                file_type: m.file_type,
            }),
        })
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HolderQuery {
    /// Holder DID whose wallet to list.
    pub holder: Option<String>,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/credentials", get(list_credentials).post(issue_credential))
        .route(
            "/v1/credentials/{id}",
            get(get_credential).delete(revoke_credential),
        )
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /v1/credentials
#[utoipa::path(
    post,
    path = "/v1/credentials",
    request_body = IssueCredentialRequest,
    responses(
        (status = 201, description = "Credential issued and stored for the holder", body = serde_json::Value),
        (status = 400, description = "Body is not valid JSON", body = crate::error::ErrorBody),
        (status = 422, description = "Invalid request or no custodial key for the issuer", body = crate::error::ErrorBody),
        (status = 503, description = "Signer unavailable", body = crate::error::ErrorBody),
    ),
    tag = "credentials"
)]
pub(crate) async fn issue_credential(
    State(state): State<AppState>,
    body: Result<Json<IssueCredentialRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Credential>), AppError> {
    let request = extract_validated_json(body)?.into_issuance()?;
    let signer = state.keyring.get(request.issuer.as_str()).ok_or_else(|| {
        AppError::Validation(format!("no custodial key for issuer {}", request.issuer))
    })?;

    let credential = issue(request, &*signer)?;
    let wallet = Arc::clone(&state.wallet);
    let stored = credential.clone();
    blocking(move || Ok(wallet.put(&stored)?)).await?;
    tracing::info!(id = %credential.id, holder = credential.holder(), "credential issued");

    Ok((StatusCode::CREATED, Json(credential)))
}

/// GET /v1/credentials?holder=<did>
#[utoipa::path(
    get,
    path = "/v1/credentials",
    params(HolderQuery),
    responses(
        (status = 200, description = "The holder's credentials, oldest first", body = serde_json::Value),
        (status = 422, description = "Missing holder parameter", body = crate::error::ErrorBody),
    ),
    tag = "credentials"
)]
pub(crate) async fn list_credentials(
    State(state): State<AppState>,
    Query(query): Query<HolderQuery>,
) -> Result<Json<Vec<Credential>>, AppError> {
    let holder = query
        .holder
        .filter(|h| !h.trim().is_empty())
        .ok_or_else(|| AppError::Validation("holder query parameter is required".into()))?;
    let credentials = blocking(move || Ok(state.wallet.list_for_holder(&holder)?)).await?;
    Ok(Json(credentials))
}

/// GET /v1/credentials/{id}
#[utoipa::path(
    get,
    path = "/v1/credentials/{id}",
    params(("id" = String, Path, description = "Credential id")),
    responses(
        (status = 200, description = "The credential", body = serde_json::Value),
        (status = 404, description = "Not in any wallet", body = crate::error::ErrorBody),
    ),
    tag = "credentials"
)]
pub(crate) async fn get_credential(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Credential>, AppError> {
    blocking(move || {
        state
            .wallet
            .get(&id)?
            .map(Json)
            .ok_or_else(|| AppError::NotFound(format!("credential {id} not found")))
    })
    .await
}

/// DELETE /v1/credentials/{id}
#[utoipa::path(
    delete,
    path = "/v1/credentials/{id}",
    params(("id" = String, Path, description = "Credential id")),
    responses(
        (status = 204, description = "Credential revoked"),
        (status = 404, description = "Not in any wallet", body = crate::error::ErrorBody),
    ),
    tag = "credentials"
)]
pub(crate) async fn revoke_credential(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let wallet = Arc::clone(&state.wallet);
    let target = id.clone();
    if blocking(move || Ok(wallet.remove(&target)?)).await? {
        tracing::info!(id = %id, "credential revoked");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("credential {id} not found")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(claims: serde_json::Value) -> IssueCredentialRequest {
        serde_json::from_value(serde_json::json!({
            "issuer": "did:ethr:1:0x1111111111111111111111111111111111111111",
            "holder": "did:ethr:1:0x2222222222222222222222222222222222222222",
            "credentialType": "IdentityCredential",
            "subjectClaims": claims,
        }))
        .unwrap()
    }

    #[test]
    fn subject_id_claim_is_rejected() {
        let err = request(serde_json::json!({"id": "did:web:evil"}))
            .validate()
            .unwrap_err();
        assert!(err.contains("\"id\""));
    }

    #[test]
    fn converts_to_issuance_request() {
        let mut req = request(serde_json::json!({"name": "Alice"}));
        req.expiration_date = Some("2030-01-01T00:00:00Z".into());
        req.validate().unwrap();
        let issuance = req.into_issuance().unwrap();
        assert_eq!(issuance.holder.method(), "ethr");
        assert_eq!(
            issuance.expiration_date.unwrap().to_iso8601(),
            "2030-01-01T00:00:00Z"
        );
    }

    #[test]
    fn offset_expiration_is_refused() {
        let mut req = request(serde_json::json!({"name": "Alice"}));
        req.expiration_date = Some("2030-01-01T00:00:00+02:00".into());
        assert!(matches!(req.into_issuance(), Err(AppError::Validation(_))));
    }

    #[test]
    fn malformed_did_is_refused() {
        let mut req = request(serde_json::json!({"name": "Alice"}));
        req.holder = "alice".into();
        assert!(matches!(req.into_issuance(), Err(AppError::Validation(_))));
    }
}
