use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use tower::ServiceExt;

use co_optimal::config::Config;
use co_optimal::db::postgres::UserStorage;
use co_optimal::router::{AppState, app_router};

const ADMIN_KEY: &str = "pwd";

/// Router wired to a lazily-connecting pool. Connections are only opened on
/// first query, so routes that fail before touching storage are exercisable
/// without a running PostgreSQL.
fn test_app() -> axum::Router {
    let cfg = Config::default();
    let storage =
        UserStorage::connect_lazy(&cfg.postgres, &cfg.pool).expect("failed to build lazy pool");
    let state = AppState::new(storage, ADMIN_KEY);
    app_router(state, &cfg.api.version_prefix, &cfg.api.cors_origins)
}

async fn body_string(resp: axum::response::Response) -> String {
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    String::from_utf8(bytes.to_vec()).expect("response body was not utf-8")
}

#[tokio::test]
async fn health_check_returns_banner() {
    let resp = test_app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/health-check")
                .body(Body::empty())
                .expect("failed to build request"),
        )
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_string(resp).await, "AI Assistant Backend V1 APIs");
}

#[tokio::test]
async fn health_check_rejects_get() {
    let resp = test_app()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/health-check")
                .body(Body::empty())
                .expect("failed to build request"),
        )
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn create_user_without_key_is_unauthorized() {
    let resp = test_app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/users")
                .header("content-type", "application/json")
                .body(Body::from(
                    r#"{"username":"alice","email":"alice@example.com","password":"long enough"}"#,
                ))
                .expect("failed to build request"),
        )
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = body_string(resp).await;
    assert!(body.contains(r#""code":"UNAUTHORIZED""#));
}

#[tokio::test]
async fn create_user_with_wrong_key_is_unauthorized() {
    let resp = test_app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/users")
                .header("content-type", "application/json")
                .header("x-api-key", "not-the-key")
                .body(Body::from(
                    r#"{"username":"alice","email":"alice@example.com","password":"long enough"}"#,
                ))
                .expect("failed to build request"),
        )
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn create_user_rejects_invalid_email() {
    let resp = test_app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/users")
                .header("content-type", "application/json")
                .header("x-api-key", ADMIN_KEY)
                .body(Body::from(
                    r#"{"username":"alice","email":"not-an-email","password":"long enough"}"#,
                ))
                .expect("failed to build request"),
        )
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_string(resp).await;
    assert!(body.contains(r#""code":"VALIDATION""#));
}

#[tokio::test]
async fn bearer_token_is_accepted_for_auth() {
    // Empty PATCH body fails validation, proving the request made it past
    // the key check.
    let resp = test_app()
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri("/api/v1/users/1")
                .header("content-type", "application/json")
                .header("authorization", format!("Bearer {ADMIN_KEY}"))
                .body(Body::from("{}"))
                .expect("failed to build request"),
        )
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_string(resp).await;
    assert!(body.contains("no fields to update"));
}

#[tokio::test]
async fn deactivate_without_key_is_unauthorized() {
    let resp = test_app()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/v1/users/1")
                .body(Body::empty())
                .expect("failed to build request"),
        )
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let resp = test_app()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/v1/unknown")
                .body(Body::empty())
                .expect("failed to build request"),
        )
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
