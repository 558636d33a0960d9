#![allow(dead_code)]

use std::io::Cursor;
use std::path::PathBuf;
use std::sync::{Arc, LazyLock};

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use image::{DynamicImage, ImageFormat, RgbImage};
use rioframe_core::rate_limit::ManualClock;
use rioframe_core::transcode::TranscodeConstraints;
use tempfile::TempDir;
use tower::ServiceExt;

use rioframe_api::auth::jwt::{generate_access_token, JwtConfig};
use rioframe_api::auth::password::hash_password;
use rioframe_api::config::{AdminConfig, ServerConfig};
use rioframe_api::router::build_app_router;
use rioframe_api::state::AppState;

pub const ADMIN_EMAIL: &str = "owner@example.com";
pub const ADMIN_PASSWORD: &str = "correct-horse-battery-staple";
/// Optimized images in tests are bounded to this width.
pub const TEST_MAX_WIDTH: u32 = 64;

const BOUNDARY: &str = "rioframe-test-boundary";

/// Hashing is slow; do it once per test binary.
static ADMIN_PASSWORD_HASH: LazyLock<String> =
    LazyLock::new(|| hash_password(ADMIN_PASSWORD).expect("hashing should succeed"));

/// Build a test `ServerConfig` rooted in `dir`.
pub fn test_config(dir: &std::path::Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        data_dir: dir.join("data"),
        uploads_dir: dir.join("uploads"),
        uploads_url_prefix: "/uploads".to_string(),
        max_upload_bytes: 1024 * 1024,
        transcode: TranscodeConstraints::new(TEST_MAX_WIDTH, None, 80).unwrap(),
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 15,
        },
        admin: AdminConfig {
            email: ADMIN_EMAIL.to_string(),
            password_hash: Some(ADMIN_PASSWORD_HASH.clone()),
        },
        contact_rate_limit_secs: 30,
        login_max_attempts: 3,
        login_window_secs: 900,
        trust_proxy: true,
    }
}

/// A router over a private temporary data and upload directory.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub clock: Arc<ManualClock>,
    dir: TempDir,
}

impl TestApp {
    pub fn app(&self) -> Router {
        self.router.clone()
    }

    pub fn uploads_dir(&self) -> PathBuf {
        self.dir.path().join("uploads")
    }

    /// A valid admin token signed with the test secret.
    pub fn admin_token(&self) -> String {
        generate_access_token(ADMIN_EMAIL, "admin", &self.state.config.jwt).unwrap()
    }

    /// A valid token for a non-admin role.
    pub fn viewer_token(&self) -> String {
        generate_access_token("viewer@example.com", "viewer", &self.state.config.jwt).unwrap()
    }
}

/// Build the full application router with all middleware layers.
pub fn build_test_app() -> TestApp {
    build_test_app_with(|_| {})
}

/// Like [`build_test_app`], with `adjust` applied to the config first.
pub fn build_test_app_with(adjust: impl FnOnce(&mut ServerConfig)) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(dir.path());
    adjust(&mut config);
    let clock = Arc::new(ManualClock::new());
    let state = AppState::with_clock(config.clone(), clock.clone());
    let router = build_app_router(state.clone(), &config);
    TestApp {
        router,
        state,
        clock,
        dir,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.unwrap()
}

fn with_auth(builder: axum::http::request::Builder, token: Option<&str>) -> axum::http::request::Builder {
    match token {
        Some(token) => builder.header(AUTHORIZATION, format!("Bearer {token}")),
        None => builder,
    }
}

fn json_request(method: Method, uri: &str, body: serde_json::Value, token: Option<&str>) -> Request<Body> {
    with_auth(Request::builder().method(method).uri(uri), token)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

fn empty_request(method: Method, uri: &str, token: Option<&str>) -> Request<Body> {
    with_auth(Request::builder().method(method).uri(uri), token)
        .body(Body::empty())
        .unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, empty_request(Method::GET, uri, None)).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, empty_request(Method::GET, uri, Some(token))).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, json_request(Method::POST, uri, body, None)).await
}

/// POST JSON as a specific client (sets `x-forwarded-for`).
pub async fn post_json_from(app: Router, uri: &str, body: serde_json::Value, client: &str) -> Response {
    let mut request = json_request(Method::POST, uri, body, None);
    request
        .headers_mut()
        .insert("x-forwarded-for", client.parse().unwrap());
    send(app, request).await
}

pub async fn post_json_auth(app: Router, uri: &str, body: serde_json::Value, token: &str) -> Response {
    send(app, json_request(Method::POST, uri, body, Some(token))).await
}

pub async fn put_json_auth(app: Router, uri: &str, body: serde_json::Value, token: &str) -> Response {
    send(app, json_request(Method::PUT, uri, body, Some(token))).await
}

pub async fn patch_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, empty_request(Method::PATCH, uri, Some(token))).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, empty_request(Method::DELETE, uri, Some(token))).await
}

/// POST a multipart form where every entry is `(field, file_name, bytes)`.
pub async fn post_multipart_auth(
    app: Router,
    uri: &str,
    files: &[(&str, &str, &[u8])],
    token: &str,
) -> Response {
    let request = with_auth(Request::builder().method(Method::POST).uri(uri), Some(token))
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(files)))
        .unwrap();
    send(app, request).await
}

pub fn multipart_body(files: &[(&str, &str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (field, file_name, bytes) in files {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// Read the response body as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A solid-colour PNG of the given size.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, image::Rgb([30, 90, 160])))
        .write_to(&mut out, ImageFormat::Png)
        .unwrap();
    out.into_inner()
}

/// Create a project through the API and return its JSON.
pub async fn create_project(test: &TestApp, body: serde_json::Value) -> serde_json::Value {
    let response = post_json_auth(test.app(), "/api/v1/admin/projects", body, &test.admin_token()).await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["data"].clone()
}
