//! Common test utilities and helpers
//!
//! Shared setup for the integration tests:
//! - A test configuration with fixed secrets
//! - An in-process `TestServer` over the real router
//! - Helpers for registering users and building bearer headers

#![allow(dead_code)]

use std::sync::Arc;

use axum::http::{header::AUTHORIZATION, HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::{json, Value};
use tribble::backend::auth::users::InMemoryUserStore;
use tribble::backend::routes::create_router;
use tribble::backend::server::{build_state, AppState, ServerConfig};

pub const ACCESS_SECRET: &str = "test-access-secret";
pub const REFRESH_SECRET: &str = "test-refresh-secret";

/// Test user credentials
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: String,
    pub email: String,
    pub password: String,
    pub access_token: String,
    pub refresh_token: String,
}

pub fn test_config() -> ServerConfig {
    ServerConfig::builder(ACCESS_SECRET, REFRESH_SECRET)
        .build()
        .expect("test configuration is valid")
}

/// Fresh application state with an empty in-memory store and its own hub.
pub fn test_state() -> AppState {
    build_state(&test_config(), Arc::new(InMemoryUserStore::new()))
}

/// In-process server over the full router.
pub fn test_server() -> (TestServer, AppState) {
    let state = test_state();
    let server = TestServer::new(create_router(state.clone())).expect("test server starts");
    (server, state)
}

/// `Authorization: Bearer <token>`
pub fn bearer(token: &str) -> (HeaderName, HeaderValue) {
    let value = HeaderValue::from_str(&format!("Bearer {}", token)).expect("token is header-safe");
    (AUTHORIZATION, value)
}

/// Register a user over HTTP and return its credentials.
pub async fn register_user(server: &TestServer, name: &str, email: &str, password: &str) -> TestUser {
    let response = server
        .post("/register")
        .json(&json!({
            "name": name,
            "email": email,
            "password": password,
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let body: Value = response.json();

    TestUser {
        id: body["user"]["id"].as_str().unwrap().to_string(),
        email: body["user"]["email"].as_str().unwrap().to_string(),
        password: password.to_string(),
        access_token: body["accessToken"].as_str().unwrap().to_string(),
        refresh_token: body["refreshToken"].as_str().unwrap().to_string(),
    }
}
