//! # sdvc-api: HTTP Binding for the Credential Engine
//!
//! A custodial service over `sdvc-vc`: it holds one Ed25519 key per DID it
//! registers and signs on that DID's behalf.
//!
//! ## API Surface
//!
//! | Route                              | Module                        |
//! |------------------------------------|-------------------------------|
//! | `POST /v1/dids`, `GET /v1/dids/*`  | [`routes::dids`]              |
//! | `/v1/credentials/*`                | [`routes::credentials`]       |
//! | `POST /v1/presentations`           | [`routes::presentations`]     |
//! | `POST /v1/verify`                  | [`routes::verify`]            |
//! | `GET /openapi.json`                | [`openapi`]                   |
//! | `GET /health/*`                    | unauthenticated probes        |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → AuthMiddleware → Handler
//! ```

pub mod auth;
pub mod error;
pub mod extractors;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::middleware::from_fn;
use axum::response::IntoResponse;
use axum::{Extension, Router};
use sdvc_vc::CredentialStore;
use tower_http::trace::TraceLayer;

use crate::auth::AuthConfig;
use crate::state::AppState;

/// Request bodies above 2 MiB are refused.
const BODY_LIMIT: usize = 2 * 1024 * 1024;

/// Assemble the application router with all routes and middleware.
///
/// Health probes are mounted outside the auth middleware.
pub fn app(state: AppState) -> Router {
    let auth_config = AuthConfig {
        token: state.config.auth_token.clone(),
    };

    let api = Router::new()
        .merge(routes::dids::router())
        .merge(routes::credentials::router())
        .merge(routes::presentations::router())
        .merge(routes::verify::router())
        .merge(openapi::router())
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(from_fn(auth::auth_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(auth_config))
        .with_state(state.clone());

    let unauthenticated = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness))
        .with_state(state);

    Router::new().merge(unauthenticated).merge(api)
}

/// Liveness probe: 200 while the process runs.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe: the registry and keyring locks are acquirable and the
/// wallet can be read.
async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    let _ = state.registry.len();
    let _ = state.keyring.len();
    if let Err(e) = state.wallet.list_for_holder("did:sdvc:readiness") {
        tracing::warn!("wallet health check failed: {e}");
        return (StatusCode::SERVICE_UNAVAILABLE, "wallet unreachable").into_response();
    }
    (StatusCode::OK, "ready").into_response()
}
