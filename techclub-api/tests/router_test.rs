//! Router tests that never reach the database
//!
//! Every request here is rejected by authentication, validation, or routing
//! before a query runs, so the pool is created lazily and never connects.

mod common;

use axum::http::{Method, StatusCode};
use common::{lazy_app, send, token_for};
use serde_json::json;
use techclub_shared::auth::jwt::{create_token, Claims};
use techclub_shared::models::user::UserRole;

#[tokio::test]
async fn test_review_routes_require_token() {
    let app = lazy_app();

    for uri in ["/api/applications", "/api/applications/stats", "/api/applications/1"] {
        let (status, body) = send(&app, Method::GET, uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{}", uri);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Access token required");
    }
}

#[tokio::test]
async fn test_malformed_token_is_forbidden() {
    let app = lazy_app();

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/applications",
        Some("not-a-jwt"),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Invalid token");
}

#[tokio::test]
async fn test_expired_token_is_forbidden() {
    let app = lazy_app();
    let token = token_for(1, UserRole::Admin, chrono::Duration::seconds(-3600));

    let (status, body) = send(&app, Method::GET, "/api/auth/me", Some(&token), None).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Token expired");
}

#[tokio::test]
async fn test_recently_expired_token_is_forbidden() {
    let app = lazy_app();
    let token = token_for(1, UserRole::Member, chrono::Duration::seconds(-30));

    let (status, body) = send(&app, Method::GET, "/api/auth/verify", Some(&token), None).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Token expired");
}

#[tokio::test]
async fn test_token_signed_with_other_secret_is_forbidden() {
    let app = lazy_app();
    let claims = Claims::new(1, UserRole::Admin, None, chrono::Duration::hours(1));
    let token = create_token(&claims, "some-other-secret-that-is-long-enough").unwrap();

    let (status, body) = send(&app, Method::POST, "/api/members/promote", Some(&token), None).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Invalid token");
}

#[tokio::test]
async fn test_incomplete_application_is_rejected() {
    let app = lazy_app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/applications",
        None,
        Some(json!({ "university_id": "2023/00042", "full_name": "Sara Ali" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "All required fields must be provided");
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = lazy_app();

    let response = tower::ServiceExt::oneshot(
        app,
        axum::http::Request::builder()
            .method(Method::POST)
            .uri("/api/applications")
            .header("content-type", "application/json")
            .body(axum::body::Body::from("{not json"))
            .unwrap(),
    )
    .await
    .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_validates_before_lookup() {
    let app = lazy_app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "university_id": "2023/00042" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "University ID and password are required");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "university_id": "23-42", "password": "secret123" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid university ID format. Expected YYYY/NNNNN");
}

#[tokio::test]
async fn test_register_rejects_invalid_input() {
    let app = lazy_app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({ "email": "sara@uni.edu" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Email and password are required");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({ "email": "not-an-email", "password": "secret123" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation failed");
    assert!(body["details"].is_array());

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/users/register",
        None,
        Some(json!({ "email": "sara@uni.edu", "password": "secret123" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "All fields are required");
}

#[tokio::test]
async fn test_api_responses_carry_security_headers() {
    let app = lazy_app();

    let response = tower::ServiceExt::oneshot(
        app,
        axum::http::Request::builder()
            .uri("/api/does-not-exist")
            .body(axum::body::Body::empty())
            .unwrap(),
    )
    .await
    .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let headers = response.headers();
    assert_eq!(headers.get("X-Content-Type-Options").unwrap(), "nosniff");
    assert_eq!(headers.get("X-Frame-Options").unwrap(), "DENY");
    assert!(headers.get("Strict-Transport-Security").is_none());
}
