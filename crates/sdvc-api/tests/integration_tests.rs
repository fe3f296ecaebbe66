//! # Integration Tests for sdvc-api
//!
//! Drives the full router: DID registration, issuance into a wallet,
//! disclosure, verification, revocation, authentication and the OpenAPI
//! document.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use sdvc_api::state::{AppConfig, AppState};

const ISSUER_ADDRESS: &str = "0x1111111111111111111111111111111111111111";
const HOLDER_ADDRESS: &str = "0x2222222222222222222222222222222222222222";

fn test_app() -> axum::Router {
    sdvc_api::app(AppState::new())
}

fn test_app_with_auth(token: &str) -> axum::Router {
    let config = AppConfig {
        auth_token: Some(token.to_string()),
        ..AppConfig::default()
    };
    sdvc_api::app(AppState::with_config(config))
}

async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn register(app: &axum::Router, address: &str) -> String {
    let (status, body) = send(app, post("/v1/dids", &json!({ "controllerAddress": address }))).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["did"].as_str().unwrap().to_string()
}

async fn issue_identity(app: &axum::Router, issuer: &str, holder: &str) -> Value {
    let (status, body) = send(
        app,
        post(
            "/v1/credentials",
            &json!({
                "issuer": issuer,
                "holder": holder,
                "credentialType": "IdentityCredential",
                "subjectClaims": { "name": "Alice", "idNumber": "X123" }
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body
}

// -- Health Probes ------------------------------------------------------------

#[tokio::test]
async fn test_health_probes() {
    let app = test_app();
    let (status, body) = send(&app, get("/health/liveness")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");
    let (status, body) = send(&app, get("/health/readiness")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ready");
}

// -- Full Flow ----------------------------------------------------------------

#[tokio::test]
async fn test_issue_disclose_verify() {
    let app = test_app();
    let issuer = register(&app, ISSUER_ADDRESS).await;
    let holder = register(&app, HOLDER_ADDRESS).await;

    let credential = issue_identity(&app, &issuer, &holder).await;
    assert_eq!(credential["credentialSubject"]["id"], holder.as_str());
    assert_eq!(credential["proof"]["verificationMethod"], format!("{issuer}#controller"));
    assert_eq!(credential["proof"]["type"], "Ed25519Signature2020");

    let (status, report) = send(&app, post("/v1/verify", &credential)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["valid"], true, "{report}");
    assert_eq!(report["status"], "valid");

    let (status, wallet) = send(&app, get(&format!("/v1/credentials?holder={holder}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(wallet.as_array().unwrap().len(), 1);

    let credential_id = credential["id"].as_str().unwrap();
    let (status, presentation) = send(
        &app,
        post(
            "/v1/presentations",
            &json!({ "credentialId": credential_id, "fields": ["name"] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{presentation}");
    assert_eq!(presentation["disclosedData"], json!({ "name": "Alice" }));
    assert!(presentation["verifiableCredential"]
        .get("credentialSubject")
        .is_none());

    let (status, report) = send(&app, post("/v1/verify", &presentation)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["valid"], true, "{report}");
    assert_eq!(report["summary"]["kind"], "presentation");
}

#[tokio::test]
async fn test_tampered_credential_fails_signature_check() {
    let app = test_app();
    let issuer = register(&app, ISSUER_ADDRESS).await;
    let holder = register(&app, HOLDER_ADDRESS).await;
    let mut credential = issue_identity(&app, &issuer, &holder).await;
    credential["credentialSubject"]["name"] = json!("Mallory");

    let (status, report) = send(&app, post("/v1/verify", &credential)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["valid"], false);
    assert_eq!(report["checks"]["signatureValid"], false);
}

#[tokio::test]
async fn test_revoked_credential_cannot_back_presentation() {
    let app = test_app();
    let issuer = register(&app, ISSUER_ADDRESS).await;
    let holder = register(&app, HOLDER_ADDRESS).await;
    let credential = issue_identity(&app, &issuer, &holder).await;
    let id = credential["id"].as_str().unwrap();

    let (_, presentation) = send(
        &app,
        post("/v1/presentations", &json!({ "credentialId": id, "fields": ["idNumber"] })),
    )
    .await;

    let (status, _) = send(&app, delete(&format!("/v1/credentials/{id}"))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, get(&format!("/v1/credentials/{id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, delete(&format!("/v1/credentials/{id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, report) = send(&app, post("/v1/verify", &presentation)).await;
    assert_eq!(report["valid"], false);
    assert_eq!(report["checks"]["sourceResolvable"], false);
}

// -- Error Mapping ------------------------------------------------------------

#[tokio::test]
async fn test_unknown_field_is_422_with_field_detail() {
    let app = test_app();
    let issuer = register(&app, ISSUER_ADDRESS).await;
    let holder = register(&app, HOLDER_ADDRESS).await;
    let credential = issue_identity(&app, &issuer, &holder).await;

    let (status, body) = send(
        &app,
        post(
            "/v1/presentations",
            &json!({ "credentialId": credential["id"], "fields": ["nonexistentField"] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["details"]["field"], "nonexistentField");
}

#[tokio::test]
async fn test_issuer_without_custodial_key_is_422() {
    let app = test_app();
    let holder = register(&app, HOLDER_ADDRESS).await;
    let (status, body) = send(
        &app,
        post(
            "/v1/credentials",
            &json!({
                "issuer": format!("did:ethr:1:{ISSUER_ADDRESS}"),
                "holder": holder,
                "credentialType": "IdentityCredential",
                "subjectClaims": { "name": "Alice" }
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("no custodial key"));
}

#[tokio::test]
async fn test_float_claim_is_422() {
    let app = test_app();
    let issuer = register(&app, ISSUER_ADDRESS).await;
    let holder = register(&app, HOLDER_ADDRESS).await;
    let (status, body) = send(
        &app,
        post(
            "/v1/credentials",
            &json!({
                "issuer": issuer,
                "holder": holder,
                "credentialType": "IdentityCredential",
                "subjectClaims": { "height": 1.75 }
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_disclose_from_unknown_credential_is_404() {
    let app = test_app();
    let (status, body) = send(
        &app,
        post(
            "/v1/presentations",
            &json!({ "credentialId": "vc:0:missing", "fields": ["name"] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_empty_field_list_is_422() {
    let app = test_app();
    let (status, _) = send(
        &app,
        post("/v1/presentations", &json!({ "credentialId": "vc:1", "fields": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

// -- DID Lookup ---------------------------------------------------------------

#[tokio::test]
async fn test_did_lookup_by_controller_and_id() {
    let app = test_app();
    let did = register(&app, "0xAbCdEf0123456789aBcDeF0123456789AbCdEf01").await;
    assert_eq!(did, "did:ethr:1:0xabcdef0123456789abcdef0123456789abcdef01");

    let (status, doc) = send(&app, get(&format!("/v1/dids/{did}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(doc["id"], did.as_str());

    let (status, doc) = send(
        &app,
        get("/v1/dids?controller=0xABCDEF0123456789ABCDEF0123456789ABCDEF01"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(doc["id"], did.as_str());

    let (status, _) = send(&app, get(&format!("/v1/dids?controller={ISSUER_ADDRESS}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// -- Authentication -----------------------------------------------------------

#[tokio::test]
async fn test_auth_required_for_api_but_not_health() {
    let app = test_app_with_auth("s3cret");

    let (status, body) = send(&app, post("/v1/verify", &json!({}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");

    let request = Request::builder()
        .method("POST")
        .uri("/v1/verify")
        .header("content-type", "application/json")
        .header("Authorization", "Bearer s3cret")
        .body(Body::from("{}"))
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, get("/health/liveness")).await;
    assert_eq!(status, StatusCode::OK);
}

// -- Persistence --------------------------------------------------------------

#[tokio::test]
async fn test_file_wallet_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig {
        wallet_dir: Some(dir.path().to_path_buf()),
        ..AppConfig::default()
    };
    let app = sdvc_api::app(AppState::with_config(config.clone()));
    let issuer = register(&app, ISSUER_ADDRESS).await;
    let holder = register(&app, HOLDER_ADDRESS).await;
    let credential = issue_identity(&app, &issuer, &holder).await;

    let restarted = sdvc_api::app(AppState::with_config(config));
    let (status, stored) = send(
        &restarted,
        get(&format!("/v1/credentials/{}", credential["id"].as_str().unwrap())),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stored, credential);
}

#[tokio::test]
async fn test_unreadable_wallet_is_500_not_an_invalid_report() {
    let dir = tempfile::tempdir().unwrap();
    let app = sdvc_api::app(AppState::with_config(AppConfig {
        wallet_dir: Some(dir.path().to_path_buf()),
        ..AppConfig::default()
    }));
    let issuer = register(&app, ISSUER_ADDRESS).await;
    let holder = register(&app, HOLDER_ADDRESS).await;
    let credential = issue_identity(&app, &issuer, &holder).await;
    let (status, presentation) = send(
        &app,
        post(
            "/v1/presentations",
            &json!({ "credentialId": credential["id"], "fields": ["name"] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{presentation}");

    // Scanned before the holder's own wallet file.
    std::fs::write(dir.path().join("credentials_a.json"), b"{ not a list").unwrap();

    let (status, body) = send(&app, post("/v1/verify", &presentation)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{body}");
    assert_eq!(body["error"]["code"], "INTERNAL_ERROR");
    assert!(body.get("valid").is_none());
}

#[tokio::test]
async fn test_source_is_checked_as_stored_in_file_wallet() {
    let dir = tempfile::tempdir().unwrap();
    let app = sdvc_api::app(AppState::with_config(AppConfig {
        wallet_dir: Some(dir.path().to_path_buf()),
        ..AppConfig::default()
    }));
    let issuer = register(&app, ISSUER_ADDRESS).await;
    let holder = register(&app, HOLDER_ADDRESS).await;
    let credential = issue_identity(&app, &issuer, &holder).await;

    // Rewrite the stored document with the legacy `context` spelling. The
    // signature covers `@context`, so this copy must fail as a source.
    let path = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().path())
        .find(|p| p.extension().is_some_and(|x| x == "json"))
        .unwrap();
    let mut stored: Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    let entry = stored[0].as_object_mut().unwrap();
    let context = entry.remove("@context").unwrap();
    entry.insert("context".into(), context);
    std::fs::write(&path, serde_json::to_vec(&stored).unwrap()).unwrap();

    let (status, fetched) = send(
        &app,
        get(&format!("/v1/credentials/{}", credential["id"].as_str().unwrap())),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(fetched.get("context").is_some());
    assert!(fetched.get("@context").is_none());

    let (_, presentation) = send(
        &app,
        post(
            "/v1/presentations",
            &json!({ "credentialId": credential["id"], "fields": ["name"] }),
        ),
    )
    .await;
    let (status, report) = send(&app, post("/v1/verify", &presentation)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["checks"]["sourceCredentialValid"], false, "{report}");
}

// -- OpenAPI ------------------------------------------------------------------

#[tokio::test]
async fn test_openapi_document_served() {
    let app = test_app();
    let (status, doc) = send(&app, get("/openapi.json")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(doc["openapi"].as_str().unwrap().starts_with("3."));
    assert!(doc["paths"]["/v1/verify"]["post"].is_object());
}
