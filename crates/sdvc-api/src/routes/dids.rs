//! # DID Registration and Resolution
//!
//! - `POST /v1/dids`: generate a custodial Ed25519 key for a controller
//!   address, derive its `did:ethr` DID and register the document.
//! - `GET /v1/dids?controller=<address>`: find the DID of an address.
//! - `GET /v1/dids/{did}`: resolve a registered document.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use sdvc_core::{build_document, derive_did, DidDocument, KeyDescriptor};
use sdvc_crypto::{Ed25519KeyPair, Ed25519Signer};

use crate::error::AppError;
use crate::extractors::{extract_validated_json, require_non_empty, Validate};
use crate::state::AppState;

fn default_chain_reference() -> String {
    "1".to_string()
}

/// Request body for DID registration.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDidRequest {
    /// `0x`-prefixed 20-byte account address.
    #[schema(example = "0x2222222222222222222222222222222222222222")]
    pub controller_address: String,
    /// Numeric chain id. Defaults to `1`.
    #[serde(default = "default_chain_reference")]
    pub chain_reference: String,
}

impl Validate for CreateDidRequest {
    fn validate(&self) -> Result<(), String> {
        require_non_empty("controllerAddress", &self.controller_address)?;
        require_non_empty("chainReference", &self.chain_reference)
    }
}

/// A registered DID and its document.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DidResponse {
    pub did: String,
    /// The custodial key's verification method.
    pub verification_method: String,
    #[schema(value_type = Object)]
    pub document: DidDocument,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ControllerQuery {
    /// Account address to look up (case-insensitive).
    pub controller: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/dids", get(find_did).post(create_did))
        .route("/v1/dids/{did}", get(resolve_did))
}

/// POST /v1/dids
#[utoipa::path(
    post,
    path = "/v1/dids",
    request_body = CreateDidRequest,
    responses(
        (status = 201, description = "DID derived and registered", body = DidResponse),
        (status = 422, description = "Invalid address, or address already registered", body = crate::error::ErrorBody),
    ),
    tag = "dids"
)]
pub(crate) async fn create_did(
    State(state): State<AppState>,
    body: Result<Json<CreateDidRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<DidResponse>), AppError> {
    let req = extract_validated_json(body)?;

    let key = Ed25519KeyPair::generate();
    let descriptor = KeyDescriptor::ed25519(key.public_key().to_hex());
    let did = derive_did(&req.controller_address, &req.chain_reference, &descriptor)?;
    let document = build_document(&did, &descriptor)?;
    state.registry.register(document.clone())?;

    let verification_method = did.controller_reference();
    let signer = Ed25519Signer::new(key, verification_method.clone());
    state.keyring.insert(did.as_str(), Arc::new(signer));
    tracing::info!(did = %did, "registered DID with custodial key");

    Ok((
        StatusCode::CREATED,
        Json(DidResponse {
            did: did.to_string(),
            verification_method,
            document,
        }),
    ))
}

/// GET /v1/dids/{did}
#[utoipa::path(
    get,
    path = "/v1/dids/{did}",
    params(("did" = String, Path, description = "The DID to resolve")),
    responses(
        (status = 200, description = "DID document", body = serde_json::Value),
        (status = 404, description = "DID not registered", body = crate::error::ErrorBody),
    ),
    tag = "dids"
)]
pub(crate) async fn resolve_did(
    State(state): State<AppState>,
    Path(did): Path<String>,
) -> Result<Json<DidDocument>, AppError> {
    state
        .registry
        .resolve(&did)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("DID {did} is not registered")))
}

/// GET /v1/dids?controller=<address>
#[utoipa::path(
    get,
    path = "/v1/dids",
    params(ControllerQuery),
    responses(
        (status = 200, description = "DID document controlled by the address", body = serde_json::Value),
        (status = 404, description = "No DID for the address", body = crate::error::ErrorBody),
        (status = 422, description = "Missing controller parameter", body = crate::error::ErrorBody),
    ),
    tag = "dids"
)]
pub(crate) async fn find_did(
    State(state): State<AppState>,
    Query(query): Query<ControllerQuery>,
) -> Result<Json<DidDocument>, AppError> {
    let controller = query
        .controller
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| AppError::Validation("controller query parameter is required".into()))?;
    state
        .registry
        .find_by_controller(&controller)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("no DID registered for {controller}")))
}
