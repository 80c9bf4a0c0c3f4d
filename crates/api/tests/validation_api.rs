//! Request validation at the HTTP boundary.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::json;

use common::{body_json, build_test_app, post_json, send};

#[tokio::test]
async fn register_rules_are_reported_per_field() {
    let app = build_test_app();
    let response = post_json(
        &app.router,
        "/auth/register",
        json!({
            "email": "not-an-email",
            "username": "al",
            "displayName": "Alice",
            "password": "12345",
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["fields"]["email"][0], "Invalid email address");
    assert_eq!(
        body["fields"]["username"][0],
        "Username must be between 3 and 20 characters long"
    );
    assert_eq!(
        body["fields"]["password"][0],
        "Password must be between 6 and 20 characters long"
    );
    assert_eq!(app.store.session_count().await, 0);
}

#[tokio::test]
async fn overlong_password_is_rejected_on_login() {
    let app = build_test_app();
    let response = post_json(
        &app.router,
        "/auth/login",
        json!({ "email": "a@x.io", "password": "x".repeat(21) }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["fields"]["password"].is_array());
}

#[tokio::test]
async fn empty_refresh_token_is_a_validation_error() {
    let app = build_test_app();
    for uri in ["/auth/refresh", "/auth/logout"] {
        let response = post_json(&app.router, uri, json!({ "refresh_token": "" })).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        let body = body_json(response).await;
        assert_eq!(body["fields"]["refresh_token"][0], "Refresh token is required");
    }
}

#[tokio::test]
async fn missing_field_is_a_bad_request() {
    let app = build_test_app();
    let response = post_json(&app.router, "/auth/refresh", json!({})).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let app = build_test_app();
    let request = Request::builder()
        .method("POST")
        .uri("/auth/login")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = send(&app.router, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}
