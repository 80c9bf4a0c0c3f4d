#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;

use snapfeed_api::auth::jwt::{JwtConfig, TokenIssuer};
use snapfeed_api::auth::memory::MemoryStore;
use snapfeed_api::auth::session::SessionManager;
use snapfeed_api::config::ServerConfig;
use snapfeed_api::media::{ImageHost, ImageHostError};
use snapfeed_api::router::build_app_router;
use snapfeed_api::state::AppState;

pub fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        access_secret: "integration-access-secret".to_string(),
        refresh_secret: "integration-refresh-secret".to_string(),
        access_token_expiry_mins: 15,
        refresh_token_expiry_days: 7,
    }
}

/// Build a test `ServerConfig` with safe defaults and a small upload cap.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".parse().unwrap()],
        request_timeout_secs: 30,
        max_upload_bytes: 64 * 1024,
        database_url: "postgres://127.0.0.1:1/snapfeed_unreachable".to_string(),
        database_max_connections: 1,
        jwt: test_jwt_config(),
        cloudinary: None,
    }
}

/// Image host that records nothing and always hands back the same URL.
pub struct FakeImageHost;

#[async_trait]
impl ImageHost for FakeImageHost {
    async fn upload(
        &self,
        folder: &str,
        _bytes: Vec<u8>,
        _mime: &str,
    ) -> Result<String, ImageHostError> {
        Ok(format!("https://img.example.com/{folder}/upload.png"))
    }
}

/// The app wired to in-memory stores.
///
/// The pool points at a closed port and fails fast, so auth routes work end
/// to end while database-backed routes surface their error path.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub issuer: TokenIssuer,
}

pub fn build_test_app() -> TestApp {
    build_test_app_with_host(None)
}

pub fn build_test_app_with_host(image_host: Option<Arc<dyn ImageHost>>) -> TestApp {
    let config = test_config();
    let pool = PgPoolOptions::new()
        .acquire_timeout(Duration::from_millis(200))
        .connect_lazy(&config.database_url)
        .expect("lazy pool from a well-formed URL");

    let store = Arc::new(MemoryStore::new());
    let sessions = Arc::new(SessionManager::new(
        TokenIssuer::new(&config.jwt).unwrap(),
        store.clone(),
        store.clone(),
    ));
    let issuer = TokenIssuer::new(&config.jwt).unwrap();

    let state = AppState {
        pool,
        config: Arc::new(config),
        sessions,
        image_host,
    };

    TestApp {
        router: build_app_router(state),
        store,
        issuer,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn post_json(app: &Router, uri: &str, body: Value) -> Response {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn get(app: &Router, uri: &str) -> Response {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn get_auth(app: &Router, uri: &str, token: &str) -> Response {
    let request = Request::builder()
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

/// Register alice and return the response body (`{accessToken, refreshToken}`).
pub async fn register_alice(app: &Router) -> Value {
    let response = post_json(
        app,
        "/auth/register",
        json!({
            "email": "a@x.io",
            "username": "alice",
            "displayName": "Alice",
            "password": "secret1",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

/// Build a `multipart/form-data` body from text fields and one optional file.
pub fn multipart_request(
    uri: &str,
    token: &str,
    content: Option<&str>,
    image: Option<&[u8]>,
) -> Request<Body> {
    const BOUNDARY: &str = "snapfeed-test-boundary";
    let mut body: Vec<u8> = Vec::new();
    if let Some(content) = content {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"content\"\r\n\r\n{content}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some(image) = image {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"a.bin\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(image);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

pub const PNG_HEADER: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
