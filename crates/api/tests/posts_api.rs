//! `/posts` and `/likes` guard and upload checks that run before any query.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;

use common::{
    body_json, build_test_app, build_test_app_with_host, get, multipart_request, register_alice,
    send, FakeImageHost, PNG_HEADER,
};

fn access_token(body: &serde_json::Value) -> String {
    body["accessToken"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn protected_routes_require_auth() {
    let app = build_test_app();
    for uri in ["/posts", "/posts/1", "/likes/1"] {
        let response = get(&app.router, uri).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
    }
}

#[tokio::test]
async fn post_without_content_is_rejected() {
    let app = build_test_app_with_host(Some(Arc::new(FakeImageHost)));
    let token = access_token(&register_alice(&app.router).await);

    let request = multipart_request("/posts", &token, Some("   "), Some(PNG_HEADER));
    let response = send(&app.router, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Content is required");
}

#[tokio::test]
async fn post_without_image_is_rejected() {
    let app = build_test_app_with_host(Some(Arc::new(FakeImageHost)));
    let token = access_token(&register_alice(&app.router).await);

    let request = multipart_request("/posts", &token, Some("hello"), None);
    let response = send(&app.router, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Image is required");
}

#[tokio::test]
async fn non_image_upload_is_rejected() {
    let app = build_test_app_with_host(Some(Arc::new(FakeImageHost)));
    let token = access_token(&register_alice(&app.router).await);

    let pdf: &[u8] = b"%PDF-1.7 not an image";
    let request = multipart_request("/posts", &token, Some("hello"), Some(pdf));
    let response = send(&app.router, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn upload_without_image_host_is_a_500() {
    let app = build_test_app();
    let token = access_token(&register_alice(&app.router).await);

    let request = multipart_request("/posts", &token, Some("hello"), Some(PNG_HEADER));
    let response = send(&app.router, request).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn oversized_upload_is_refused() {
    let app = build_test_app_with_host(Some(Arc::new(FakeImageHost)));
    let token = access_token(&register_alice(&app.router).await);

    let mut image = PNG_HEADER.to_vec();
    image.resize(128 * 1024, 0);
    let request = multipart_request("/posts", &token, Some("hello"), Some(&image));
    let response = send(&app.router, request).await;

    assert!(response.status().is_client_error());
}
