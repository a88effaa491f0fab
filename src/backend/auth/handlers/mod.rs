//! Authentication Handlers Module
//!
//! This module contains the HTTP handlers for the auth and account endpoints.
//!
//! # Module Structure
//!
//! ```text
//! handlers/
//! ├── mod.rs      - Module exports and shared helpers
//! ├── types.rs    - Request and response types
//! ├── register.rs - User registration handler
//! ├── login.rs    - User authentication handler
//! ├── refresh.rs  - Token refresh handler
//! └── account.rs  - Current user and account management handlers
//! ```
//!
//! # Handlers
//!
//! - **`register`** - POST /register - User registration
//! - **`login`** - POST /login - User authentication
//! - **`refresh_token`** - POST /refresh-token - New token pair from a refresh token
//! - **`get_me`** - GET /me - Claims of the calling user
//! - **`list_users`** - GET /users - Public view of every user
//! - **`update_user`** - PUT /users - Change the caller's name or email
//! - **`get_user`** - GET /users/{id} - Public view of a user
//! - **`update_password`** - PUT /users/password - Change the caller's password
//! - **`delete_user`** - DELETE /users/{id} - Delete the caller's account
//!
//! bcrypt is CPU-bound, so hashing and verification run on the blocking
//! thread pool.

use axum::extract::rejection::JsonRejection;
use axum::Json;

use crate::backend::auth::password::{hash_password, verify_password};
use crate::backend::error::BackendError;

/// Request and response types
pub mod types;

/// Registration handler
pub mod register;

/// Login handler
pub mod login;

/// Refresh exchange handler
pub mod refresh;

/// Current user and account handlers
pub mod account;

// Re-export commonly used types
pub use types::{
    AuthResponse, LoginRequest, RefreshRequest, RegisterRequest, UpdateUserRequest, UserResponse,
};

// Re-export handlers
pub use account::{delete_user, get_me, get_user, list_users, update_password, update_user};
pub use login::login;
pub use refresh::refresh_token;
pub use register::register;

/// Unwrap a JSON body, turning any rejection into a 400.
pub(crate) fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, BackendError> {
    body.map(|Json(value)| value).map_err(|rejection| {
        tracing::debug!("Rejected request body: {}", rejection.body_text());
        BackendError::bad_request("bad request")
    })
}

pub(crate) async fn hash_off_thread(password: String) -> Result<String, BackendError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| BackendError::internal(format!("hashing task failed: {}", e)))?
        .map_err(BackendError::from)
}

pub(crate) async fn verify_off_thread(
    password: String,
    stored_hash: String,
) -> Result<bool, BackendError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
        .await
        .map_err(|e| BackendError::internal(format!("verification task failed: {}", e)))
}
