/**
 * Registration Handler
 *
 * This module implements the user registration handler for POST /register.
 *
 * # Registration Process
 *
 * 1. Validate name, email and password
 * 2. Hash the password with bcrypt
 * 3. Store the user (email lowercased, must be unused)
 * 4. Issue an access + refresh token pair
 */

use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};
use chrono::Utc;

use crate::backend::auth::handlers::types::{AuthResponse, RegisterRequest};
use crate::backend::auth::handlers::{hash_off_thread, json_body};
use crate::backend::auth::sessions::TokenService;
use crate::backend::auth::users::{normalize_email, SharedUserStore, StoreError, User, UserStore};
use crate::backend::error::BackendError;

/// Registration handler
///
/// # Errors
///
/// * `400 Bad Request` - Malformed body, empty name or password, or an email
///   without `@`
/// * `409 Conflict` - The email is already registered
/// * `500 Internal Server Error` - Hashing, storage or signing failed
///
/// # Example Request
///
/// ```http
/// POST /register HTTP/1.1
/// Content-Type: application/json
///
/// {
///   "name": "Ada",
///   "email": "ada@example.com",
///   "password": "correct horse"
/// }
/// ```
///
/// # Example Response
///
/// ```json
/// {
///   "message": "user created",
///   "user": { "id": "u_6f9c...", "name": "Ada", "email": "ada@example.com" },
///   "accessToken": "eyJ0eXAiOiJKV1QiLCJhbGciOiJIUzI1NiJ9...",
///   "refreshToken": "eyJ0eXAiOiJKV1QiLCJhbGciOiJIUzI1NiJ9..."
/// }
/// ```
pub async fn register(
    State(users): State<SharedUserStore>,
    State(tokens): State<TokenService>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthResponse>), BackendError> {
    let request = json_body(body)?;
    request.validate().map_err(BackendError::bad_request)?;

    // Checked up front to skip the hashing cost; `create` enforces it anyway.
    if users.find_by_email(&request.email).await?.is_some() {
        return Err(StoreError::Conflict(normalize_email(&request.email)).into());
    }

    let password_hash = hash_off_thread(request.password).await?;
    let user = users
        .create(User::new(request.name.trim(), &request.email, password_hash))
        .await?;

    let tokens = tokens.issue_pair(&user.id, &user.name, &user.email, Utc::now().timestamp())?;

    tracing::info!("User registered: {}", user.id);

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "user created".to_string(),
            user: user.into(),
            tokens,
        }),
    ))
}
