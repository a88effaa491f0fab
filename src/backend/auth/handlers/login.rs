/**
 * Login Handler
 *
 * This module implements the user authentication handler for POST /login.
 *
 * # Authentication Process
 *
 * 1. Look up user by email
 * 2. Verify password using bcrypt
 * 3. Issue an access + refresh token pair
 *
 * # Security
 *
 * - An unknown email and a wrong password return the same 401 response
 * - Passwords are never logged or returned in responses
 */

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use chrono::Utc;

use crate::backend::auth::handlers::types::{AuthResponse, LoginRequest};
use crate::backend::auth::handlers::{json_body, verify_off_thread};
use crate::backend::auth::sessions::TokenService;
use crate::backend::auth::users::{SharedUserStore, UserStore};
use crate::backend::error::BackendError;

const INVALID_CREDENTIALS: &str = "invalid email or password";

/// Login handler
///
/// # Errors
///
/// * `400 Bad Request` - Malformed body
/// * `401 Unauthorized` - Unknown email or wrong password
/// * `500 Internal Server Error` - Storage or signing failed
pub async fn login(
    State(users): State<SharedUserStore>,
    State(tokens): State<TokenService>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, BackendError> {
    let request = json_body(body)?;

    let user = users.find_by_email(&request.email).await?.ok_or_else(|| {
        tracing::warn!("Login for unknown email");
        BackendError::Unauthenticated(INVALID_CREDENTIALS.to_string())
    })?;

    if !verify_off_thread(request.password, user.password_hash.clone()).await? {
        tracing::warn!("Invalid password for user: {}", user.id);
        return Err(BackendError::Unauthenticated(INVALID_CREDENTIALS.to_string()));
    }

    let tokens = tokens.issue_pair(&user.id, &user.name, &user.email, Utc::now().timestamp())?;

    tracing::info!("User logged in: {}", user.id);

    Ok(Json(AuthResponse {
        message: "login successful".to_string(),
        user: user.into(),
        tokens,
    }))
}
