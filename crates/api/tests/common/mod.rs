//! Shared helpers for HTTP-level integration tests.
//!
//! Requests are driven through `tower::ServiceExt::oneshot` against the same
//! router (routes + middleware) that production uses.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use eventify_api::auth::jwt::JwtConfig;
use eventify_api::auth::password::hash_password;
use eventify_api::config::ServerConfig;
use eventify_api::router::build_app_router;
use eventify_api::state::AppState;
use eventify_db::models::event::{CreateEvent, Event};
use eventify_db::models::user::{CreateUser, User};
use eventify_db::repositories::{EventRepo, UserRepo};

/// Role ids as seeded by the roles migration.
pub const ADMIN_ROLE_ID: i64 = 1;
pub const STUDENT_ROLE_ID: i64 = 2;

/// Build a test `ServerConfig` with safe defaults and a fixed JWT secret.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        upload_dir: std::env::temp_dir().join("eventify-test-uploads"),
        public_base_url: "http://localhost:3000".to_string(),
        expose_error_detail: false,
        jwt: JwtConfig {
            secret: "integration-test-signing-secret-0123456789".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        },
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool. Mirrors `main.rs` so tests exercise the production
/// middleware stack.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: &Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: &Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(
    app: &Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn put_json_auth(
    app: &Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: &Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

/// Read and parse a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
}

// ---------------------------------------------------------------------------
// Multipart helpers
// ---------------------------------------------------------------------------

/// Minimal `multipart/form-data` body builder for event create/update tests.
pub struct MultipartForm {
    boundary: String,
    body: Vec<u8>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self {
            boundary: "----eventify-test-boundary-7MA4YWxk".to_string(),
            body: Vec::new(),
        }
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\ncontent-disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n",
                self.boundary
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, filename: &str, content_type: &str, data: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\ncontent-disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                 content-type: {content_type}\r\n\r\n",
                self.boundary
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(data);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    fn finish(mut self) -> (String, Vec<u8>) {
        let content_type = format!("multipart/form-data; boundary={}", self.boundary);
        self.body
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        (content_type, self.body)
    }
}

async fn send_multipart(
    app: &Router,
    method: Method,
    uri: &str,
    form: MultipartForm,
    token: &str,
) -> Response<Body> {
    let (content_type, body) = form.finish();
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .header("content-type", content_type)
        .body(Body::from(body))
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

pub async fn post_multipart_auth(
    app: &Router,
    uri: &str,
    form: MultipartForm,
    token: &str,
) -> Response<Body> {
    send_multipart(app, Method::POST, uri, form, token).await
}

pub async fn put_multipart_auth(
    app: &Router,
    uri: &str,
    form: MultipartForm,
    token: &str,
) -> Response<Body> {
    send_multipart(app, Method::PUT, uri, form, token).await
}

// ---------------------------------------------------------------------------
// Seeding helpers
// ---------------------------------------------------------------------------

/// Create a user directly in the database; returns the row and the plaintext
/// password.
pub async fn create_test_user(
    pool: &PgPool,
    name: &str,
    email: &str,
    role_id: i64,
) -> (User, String) {
    let password = "test_password_123!";
    let hashed = hash_password(password).expect("hashing should succeed");
    let user = UserRepo::create(
        pool,
        &CreateUser {
            name: name.to_string(),
            email: email.to_string(),
            password_hash: hashed,
            role_id,
        },
    )
    .await
    .expect("user creation should succeed");
    (user, password.to_string())
}

/// Log in via the API and return the JSON response body.
pub async fn login_user(
    app: &Router,
    email: &str,
    password: &str,
    role: &str,
) -> serde_json::Value {
    let body = serde_json::json!({ "email": email, "password": password, "role": role });
    let response = post_json(app, "/api/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

/// Create an admin account and return a valid access token for it.
pub async fn admin_token(pool: &PgPool, app: &Router) -> String {
    let (_user, password) =
        create_test_user(pool, "Test Admin", "admin@test.edu", ADMIN_ROLE_ID).await;
    let json = login_user(app, "admin@test.edu", &password, "admin").await;
    json["access_token"].as_str().unwrap().to_string()
}

/// Insert an event directly through the repository layer.
pub async fn seed_event(pool: &PgPool, title: &str, capacity: i32) -> Event {
    let input = CreateEvent {
        title: title.to_string(),
        description: "Seeded by the test suite".to_string(),
        start_date: chrono::NaiveDate::from_ymd_opt(2099, 5, 10).unwrap(),
        end_date: chrono::NaiveDate::from_ymd_opt(2099, 5, 11).unwrap(),
        event_time: chrono::NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        location_type: "offline".to_string(),
        location: "Main Hall".to_string(),
        category: "Workshop".to_string(),
        capacity,
        organizer: "Student Affairs".to_string(),
        event_image: None,
        event_features: vec!["Certificate".to_string()],
    };
    EventRepo::create(pool, &input)
        .await
        .expect("event creation should succeed")
}

/// JSON body for a valid registration on the given event.
pub fn registration_body(event_id: i64, email: &str, student_id: &str) -> serde_json::Value {
    serde_json::json!({
        "event_id": event_id,
        "name": "Jordan Lee",
        "email": email,
        "student_id": student_id,
        "phone_number": "5550100",
        "department": "Computer Science",
        "semester": "6",
    })
}
