#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use chronicis_api::auth::jwt::{generate_access_token, JwtConfig, TokenProfile};
use chronicis_api::config::ServerConfig;
use chronicis_api::router::build_app_router;
use chronicis_api::state::AppState;
use chronicis_api::storage::LocalBlobStore;

pub const TEST_JWT_SECRET: &str = "test-secret-for-integration-tests";

/// Subject listed as a system administrator in [`test_config`].
pub const ADMIN_SUBJECT: &str = "auth0|sysadmin";

fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: TEST_JWT_SECRET.to_string(),
        issuer: None,
        access_token_expiry_mins: 15,
    }
}

/// Build a test `ServerConfig` with safe defaults and a throwaway blob root.
pub fn test_config(document_storage_root: PathBuf) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        db_max_connections: 5,
        jwt: test_jwt_config(),
        sysadmin_subjects: vec![ADMIN_SUBJECT.to_string()],
        document_storage_root,
    }
}

/// Build the full application router over `pool`.
///
/// Documents are written to a fresh temporary directory that outlives the
/// test process.
pub fn build_test_app(pool: PgPool) -> Router {
    let blob_root = tempfile::tempdir()
        .expect("create blob dir")
        .keep();
    let config = test_config(blob_root.clone());
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        blob_store: Arc::new(LocalBlobStore::new(blob_root)),
    };
    build_app_router(state, &config)
}

/// Sign a token for `subject`, using it as the display name too.
pub fn token_for(subject: &str) -> String {
    generate_access_token(
        &TokenProfile {
            subject,
            email: Some(&format!("{}@example.com", subject.replace('|', "-"))),
            name: Some(subject.rsplit('|').next().unwrap_or(subject)),
            picture: None,
        },
        &test_jwt_config(),
    )
    .expect("sign test token")
}

async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.unwrap()
}

fn json_request(method: Method, uri: &str, token: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

/// Send an unauthenticated GET.
pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json_auth(app: Router, uri: &str, token: &str, body: serde_json::Value) -> Response {
    send(app, json_request(Method::POST, uri, token, body)).await
}

pub async fn put_json_auth(app: Router, uri: &str, token: &str, body: serde_json::Value) -> Response {
    send(app, json_request(Method::PUT, uri, token, body)).await
}

pub async fn patch_json_auth(app: Router, uri: &str, token: &str, body: serde_json::Value) -> Response {
    send(app, json_request(Method::PATCH, uri, token, body)).await
}

pub async fn put_bytes_auth(app: Router, uri: &str, token: &str, bytes: Vec<u8>) -> Response {
    let request = Request::builder()
        .method(Method::PUT)
        .uri(uri)
        .header("content-type", "application/octet-stream")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::from(bytes))
        .unwrap();
    send(app, request).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

/// Collect a response body into bytes.
pub async fn body_bytes(response: Response) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

/// Parse a response body as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/* --------------------------------------------------------------------------
Fixtures
-------------------------------------------------------------------------- */

/// Create a world as `token` and return its JSON (`data`).
pub async fn create_world(app: Router, token: &str, name: &str) -> serde_json::Value {
    let response = post_json_auth(
        app,
        "/api/v1/worlds",
        token,
        serde_json::json!({ "name": name }),
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["data"].clone()
}

/// Create an article and return its JSON (`data`).
pub async fn create_article(app: Router, token: &str, body: serde_json::Value) -> serde_json::Value {
    let response = post_json_auth(app, "/api/v1/articles", token, body).await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["data"].clone()
}

/// Invite `subject` into `world_id` with `role` and have them join.
pub async fn add_member(app: Router, owner: &str, world_id: &str, subject: &str, role: &str) {
    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/worlds/{world_id}/invitations"),
        owner,
        serde_json::json!({ "role": role }),
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    let code = body_json(response).await["data"]["code"]
        .as_str()
        .unwrap()
        .to_string();

    let response = post_json_auth(
        app,
        "/api/v1/worlds/join",
        &token_for(subject),
        serde_json::json!({ "code": code }),
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::OK);
}

/// Id of the seeded campaign ("Campaign 1") of a new world.
pub async fn first_campaign(app: Router, token: &str, world_id: &str) -> serde_json::Value {
    let response = get_auth(app, &format!("/api/v1/worlds/{world_id}/campaigns"), token).await;
    body_json(response).await["data"][0].clone()
}

/// Id of the seeded arc of `campaign_id`.
pub async fn first_arc(app: Router, token: &str, campaign_id: &str) -> serde_json::Value {
    let response = get_auth(app, &format!("/api/v1/campaigns/{campaign_id}/arcs"), token).await;
    body_json(response).await["data"][0].clone()
}
