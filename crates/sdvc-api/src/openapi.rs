//! # OpenAPI Specification Assembly
//!
//! Collects the utoipa-documented handlers into one document served at
//! `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "sdvc API",
        version = "0.1.0",
        description = "Verifiable Credential issuance, selective disclosure and verification over did:ethr identifiers."
    ),
    paths(
        crate::routes::dids::create_did,
        crate::routes::dids::find_did,
        crate::routes::dids::resolve_did,
        crate::routes::credentials::issue_credential,
        crate::routes::credentials::list_credentials,
        crate::routes::credentials::get_credential,
        crate::routes::credentials::revoke_credential,
        crate::routes::presentations::create_presentation,
        crate::routes::verify::verify_artifact,
    ),
    components(schemas(
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
        crate::routes::dids::CreateDidRequest,
        crate::routes::dids::DidResponse,
        crate::routes::credentials::IssueCredentialRequest,
        crate::routes::credentials::MetadataInput,
        crate::routes::presentations::DiscloseRequest,
    )),
    tags(
        (name = "dids", description = "DID derivation and resolution"),
        (name = "credentials", description = "Issuance and holder wallets"),
        (name = "presentations", description = "Selective disclosure"),
        (name = "verification", description = "Credential and presentation verification"),
    )
)]
pub struct ApiDoc;

/// Serves the OpenAPI JSON document at `/openapi.json`.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
