//! Test utilities for the API integration tests
//!
//! Builds an application rooted in a temporary data directory and offers
//! small helpers for driving the router without a socket.
#![allow(dead_code)]

use std::sync::Arc;

use authgate_backend_lib::{
    config::Settings,
    models::{NewUser, User},
    router::create_router,
    AppState,
};
use axum::{
    body::Body,
    http::{HeaderMap, Request, StatusCode},
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

pub const EMAIL: &str = "a@b.com";
pub const PASSWORD: &str = "secret";

/// Settings pointing at `temp_dir` with the given strategy
pub fn test_settings(temp_dir: &TempDir, auth_type: Option<&str>) -> Settings {
    Settings {
        data_dir: temp_dir.path().to_path_buf(),
        auth_type: auth_type.map(String::from),
        ..Settings::default()
    }
}

/// Sets up an app with the given strategy in a fresh temporary directory.
/// Keep the returned directory in scope for the duration of the test.
pub async fn setup_app(auth_type: Option<&str>) -> (Router, Arc<AppState>, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let (app, state) = app_from_settings(test_settings(&temp_dir, auth_type)).await;
    (app, state, temp_dir)
}

pub async fn app_from_settings(settings: Settings) -> (Router, Arc<AppState>) {
    let state = Arc::new(
        AppState::new(settings)
            .await
            .expect("Failed to create AppState for test"),
    );
    (create_router(state.clone()), state)
}

/// Store a user with [`EMAIL`] and [`PASSWORD`] directly
pub async fn seed_user(state: &AppState) -> User {
    let mut user = User::new(NewUser {
        email: Some(EMAIL.to_string()),
        password: Some(PASSWORD.to_string()),
        first_name: Some("Ada".to_string()),
        last_name: None,
    })
    .unwrap();
    state.users.save(&mut user).await.unwrap();
    user
}

pub fn basic_header(credentials: &str) -> String {
    format!("Basic {}", STANDARD.encode(credentials))
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn get_with(uri: &str, header: &str, value: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header, value)
        .body(Body::empty())
        .unwrap()
}

pub fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn login_request(form: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/v1/auth_session/login")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(form.to_string()))
        .unwrap()
}

/// Run one request and decode the JSON body (`Null` when empty)
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, headers, json)
}

/// `name=value` from the response's Set-Cookie header
pub fn session_cookie_pair(headers: &HeaderMap) -> String {
    headers
        .get("set-cookie")
        .expect("no Set-Cookie header")
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string()
}
