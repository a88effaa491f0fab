//! Authentication API integration tests
//!
//! Exercises the auth gate and the account endpoints through the real router.

#![cfg(feature = "ssr")]

mod common;

use axum::http::{header::AUTHORIZATION, HeaderValue, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use common::{bearer, register_user, test_server};

#[tokio::test]
async fn test_register_returns_user_and_tokens() {
    let (server, state) = test_server();

    let response = server
        .post("/register")
        .json(&json!({
            "name": "Ada",
            "email": "Ada@Example.com",
            "password": "correct horse",
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["user"]["email"], "ada@example.com");
    assert_eq!(body["user"]["name"], "Ada");
    assert!(body["user"].get("password_hash").is_none());

    let access = body["accessToken"].as_str().unwrap();
    let refresh = body["refreshToken"].as_str().unwrap();
    let claims = state.tokens.verify_access(access).unwrap();
    assert_eq!(claims.sub, body["user"]["id"].as_str().unwrap());
    assert!(state.tokens.verify_refresh(refresh).is_some());
}

#[tokio::test]
async fn test_register_validation() {
    let (server, _) = test_server();

    for body in [
        json!({ "name": "Ada", "email": "no-at-sign", "password": "pw" }),
        json!({ "name": "Ada", "email": "ada@example.com", "password": "" }),
        json!({ "name": "", "email": "ada@example.com", "password": "pw" }),
        json!({ "email": "ada@example.com", "password": "pw" }),
    ] {
        let response = server.post("/register").json(&body).await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST, "{}", body);
    }

    let response = server.post("/register").text("not json").await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_register_duplicate_email_conflicts() {
    let (server, _) = test_server();
    register_user(&server, "Ada", "ada@example.com", "pw1").await;

    let response = server
        .post("/register")
        .json(&json!({ "name": "Other", "email": "ADA@example.com", "password": "pw2" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CONFLICT);
    let body: Value = response.json();
    assert_eq!(body["status"], 409);
}

#[tokio::test]
async fn test_register_ignores_authorization_header() {
    let (server, _) = test_server();

    let response = server
        .post("/register")
        .add_header(AUTHORIZATION, HeaderValue::from_static("Bearer junk"))
        .json(&json!({ "name": "Ada", "email": "ada@example.com", "password": "pw" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_login() {
    let (server, state) = test_server();
    let user = register_user(&server, "Ada", "ada@example.com", "correct horse").await;

    let response = server
        .post("/login")
        .json(&json!({ "email": "ada@example.com", "password": "correct horse" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    let claims = state
        .tokens
        .verify_access(body["accessToken"].as_str().unwrap())
        .unwrap();
    assert_eq!(claims.sub, user.id);
    assert_eq!(claims.email, "ada@example.com");
}

#[tokio::test]
async fn test_login_failures_look_the_same() {
    let (server, _) = test_server();
    register_user(&server, "Ada", "ada@example.com", "correct horse").await;

    let wrong_password = server
        .post("/login")
        .json(&json!({ "email": "ada@example.com", "password": "battery staple" }))
        .await;
    let unknown_email = server
        .post("/login")
        .json(&json!({ "email": "grace@example.com", "password": "correct horse" }))
        .await;

    assert_eq!(wrong_password.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.text(), unknown_email.text());
}

#[tokio::test]
async fn test_gate_rejection_reasons() {
    let (server, _) = test_server();

    let response = server.get("/me").await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["error"], "missing credential");

    let response = server
        .get("/me")
        .add_header(AUTHORIZATION, HeaderValue::from_static("Basic YWRhOnB3"))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["error"], "malformed credential");

    let (name, value) = bearer("not.a.token");
    let response = server.get("/me").add_header(name, value).await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["error"], "unauthenticated");
}

#[tokio::test]
async fn test_me_returns_verified_claims() {
    let (server, _) = test_server();
    let user = register_user(&server, "Ada", "ada@example.com", "pw").await;

    let (name, value) = bearer(&user.access_token);
    let response = server.get("/me").add_header(name, value).await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["sub"], user.id.as_str());
    assert_eq!(body["name"], "Ada");
    assert_eq!(body["kind"], "access");
}

#[tokio::test]
async fn test_refresh_token_is_not_a_bearer_credential() {
    let (server, _) = test_server();
    let user = register_user(&server, "Ada", "ada@example.com", "pw").await;

    let (name, value) = bearer(&user.refresh_token);
    let response = server.get("/me").add_header(name, value).await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_exchange() {
    let (server, _) = test_server();
    let user = register_user(&server, "Ada", "ada@example.com", "pw").await;

    let response = server
        .post("/refresh-token")
        .json(&json!({ "id": user.id, "token": user.refresh_token }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: Value = response.json();
    let (name, value) = bearer(body["accessToken"].as_str().unwrap());
    let me = server.get("/me").add_header(name, value).await;
    assert_eq!(me.status_code(), StatusCode::OK);
    assert!(body["refreshToken"].as_str().is_some());
}

#[tokio::test]
async fn test_refresh_exchange_failures() {
    let (server, _) = test_server();
    let user = register_user(&server, "Ada", "ada@example.com", "pw").await;
    let other = register_user(&server, "Grace", "grace@example.com", "pw").await;

    // Access token in place of a refresh token
    let response = server
        .post("/refresh-token")
        .json(&json!({ "id": user.id, "token": user.access_token }))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

    // Someone else's id
    let response = server
        .post("/refresh-token")
        .json(&json!({ "id": other.id, "token": user.refresh_token }))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

    // Missing field
    let response = server
        .post("/refresh-token")
        .json(&json!({ "id": user.id }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_user() {
    let (server, _) = test_server();
    let user = register_user(&server, "Ada", "ada@example.com", "pw").await;
    let (name, value) = bearer(&user.access_token);

    let response = server
        .get(&format!("/users/{}", user.id))
        .add_header(name.clone(), value.clone())
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(
        response.json::<Value>(),
        json!({ "id": user.id, "name": "Ada", "email": "ada@example.com" })
    );

    let response = server.get("/users/u_missing").add_header(name, value).await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_password() {
    let (server, _) = test_server();
    let user = register_user(&server, "Ada", "ada@example.com", "old password").await;
    let (name, value) = bearer(&user.access_token);

    let response = server
        .put("/users/password")
        .add_header(name, value)
        .json(&json!({ "password": "new password" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let old = server
        .post("/login")
        .json(&json!({ "email": user.email, "password": "old password" }))
        .await;
    assert_eq!(old.status_code(), StatusCode::UNAUTHORIZED);

    let new = server
        .post("/login")
        .json(&json!({ "email": user.email, "password": "new password" }))
        .await;
    assert_eq!(new.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn test_delete_user() {
    let (server, _) = test_server();
    let user = register_user(&server, "Ada", "ada@example.com", "pw").await;
    let other = register_user(&server, "Grace", "grace@example.com", "pw").await;
    let (name, value) = bearer(&user.access_token);

    let response = server
        .delete(&format!("/users/{}", other.id))
        .add_header(name.clone(), value.clone())
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

    let response = server
        .delete(&format!("/users/{}", user.id))
        .add_header(name, value)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let login = server
        .post("/login")
        .json(&json!({ "email": user.email, "password": "pw" }))
        .await;
    assert_eq!(login.status_code(), StatusCode::UNAUTHORIZED);

    let refresh = server
        .post("/refresh-token")
        .json(&json!({ "id": user.id, "token": user.refresh_token }))
        .await;
    assert_eq!(refresh.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_health_requires_a_token() {
    let (server, _) = test_server();

    let response = server.get("/health").await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

    let user = register_user(&server, "Ada", "ada@example.com", "pw").await;
    let (name, value) = bearer(&user.access_token);
    let response = server.get("/health").add_header(name, value).await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>(), json!({ "status": "ok", "connections": 0 }));
}

#[tokio::test]
async fn test_list_users() {
    let (server, _) = test_server();
    let ada = register_user(&server, "Ada", "ada@example.com", "pw").await;
    register_user(&server, "Grace", "grace@example.com", "pw").await;

    let response = server.get("/users").await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

    let (name, value) = bearer(&ada.access_token);
    let response = server.get("/users").add_header(name, value).await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    let users = body["users"].as_array().unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[0]["email"], "ada@example.com");
    assert_eq!(users[1]["email"], "grace@example.com");
    assert!(users.iter().all(|user| user.get("password_hash").is_none()));
}

#[tokio::test]
async fn test_update_own_profile() {
    let (server, _) = test_server();
    let user = register_user(&server, "Ada", "ada@example.com", "pw").await;
    let (name, value) = bearer(&user.access_token);

    let response = server
        .put("/users")
        .add_header(name, value)
        .json(&json!({ "name": "Ada Lovelace", "email": "Lovelace@Example.com" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["user"]["id"], user.id.as_str());
    assert_eq!(body["user"]["name"], "Ada Lovelace");
    assert_eq!(body["user"]["email"], "lovelace@example.com");

    let old_login = server
        .post("/login")
        .json(&json!({ "email": "ada@example.com", "password": "pw" }))
        .await;
    assert_eq!(old_login.status_code(), StatusCode::UNAUTHORIZED);

    let new_login = server
        .post("/login")
        .json(&json!({ "email": "lovelace@example.com", "password": "pw" }))
        .await;
    assert_eq!(new_login.status_code(), StatusCode::OK);
    assert_eq!(new_login.json::<Value>()["user"]["name"], "Ada Lovelace");
}

#[tokio::test]
async fn test_update_profile_failures() {
    let (server, _) = test_server();
    let user = register_user(&server, "Ada", "ada@example.com", "pw").await;
    register_user(&server, "Grace", "grace@example.com", "pw").await;
    let (name, value) = bearer(&user.access_token);

    let taken = server
        .put("/users")
        .add_header(name.clone(), value.clone())
        .json(&json!({ "email": "grace@example.com" }))
        .await;
    assert_eq!(taken.status_code(), StatusCode::CONFLICT);

    let empty = server
        .put("/users")
        .add_header(name, value)
        .json(&json!({}))
        .await;
    assert_eq!(empty.status_code(), StatusCode::BAD_REQUEST);

    let anonymous = server.put("/users").json(&json!({ "name": "Nobody" })).await;
    assert_eq!(anonymous.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_overlong_passwords_are_bad_requests() {
    let (server, _) = test_server();
    let long = format!("{}second", "a".repeat(72));

    let response = server
        .post("/register")
        .json(&json!({ "name": "Ada", "email": "ada@example.com", "password": long }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let user = register_user(&server, "Ada", "ada@example.com", &"a".repeat(71)).await;
    let (name, value) = bearer(&user.access_token);
    let response = server
        .put("/users/password")
        .add_header(name, value)
        .json(&json!({ "password": long }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let login = server
        .post("/login")
        .json(&json!({ "email": "ada@example.com", "password": long }))
        .await;
    assert_eq!(login.status_code(), StatusCode::UNAUTHORIZED);
}
