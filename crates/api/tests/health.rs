//! Integration tests for the health check and general HTTP behaviour.

mod common;

use std::time::Duration;

use axum::http::StatusCode;
use common::{body_json, get};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

#[sqlx::test(migrations = "../db/migrations")]
async fn health_check_returns_ok_with_json(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
    assert_eq!(json["db_healthy"], true);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn readiness_is_ok_with_a_reachable_database(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/health/ready").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["db_healthy"], true);
}

#[tokio::test]
async fn readiness_is_unavailable_without_a_database() {
    // Nothing listens on port 1, so every acquire fails fast.
    let pool = PgPoolOptions::new()
        .acquire_timeout(Duration::from_millis(500))
        .connect_lazy("postgres://chronicis@127.0.0.1:1/chronicis")
        .unwrap();
    let app = common::build_test_app(pool);

    let response = get(app.clone(), "/health/ready").await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = body_json(response).await;
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["db_healthy"], false);

    // Liveness still answers.
    let response = get(app, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["db_healthy"], false);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn responses_carry_a_request_id(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/health").await;
    assert!(response.headers().contains_key("x-request-id"));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn unknown_route_returns_404(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/this-route-does-not-exist").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn api_routes_require_a_token(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/worlds").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["code"], "UNAUTHORIZED");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn garbage_tokens_are_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = common::get_auth(app, "/api/v1/me", "not-a-jwt").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn first_request_creates_the_user(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = common::token_for("auth0|alice");

    let response = common::get_auth(app.clone(), "/api/v1/me", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let first = body_json(response).await["data"].clone();
    assert_eq!(first["display_name"], "alice");
    assert_eq!(first["is_sysadmin"], false);

    let response = common::get_auth(app, "/api/v1/me", &token).await;
    let second = body_json(response).await["data"].clone();
    assert_eq!(first["id"], second["id"]);
}
