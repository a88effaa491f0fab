/**
 * Backend Error Types
 *
 * This module defines the error type returned by HTTP handlers. Each variant
 * maps to one HTTP status code.
 *
 * # Error Categories
 *
 * ## Client Errors
 *
 * - Malformed or invalid request bodies, passwords too long to hash (400)
 * - Missing, malformed or unverifiable credentials (401)
 * - Acting on another user's account (403)
 * - Unknown resources (404)
 * - Duplicate email on registration (409)
 *
 * ## Internal Errors
 *
 * Hashing, signing and storage failures. These are logged in full and
 * reported to the client with a generic message only.
 */

use axum::http::StatusCode;
use thiserror::Error;

use crate::backend::auth::password::CredentialError;
use crate::backend::auth::sessions::TokenError;
use crate::backend::auth::users::StoreError;

/// Message sent to clients for every 5xx response
const INTERNAL_MESSAGE: &str = "internal server error";

/// Backend-specific error types
///
/// # Usage
///
/// ```rust
/// use tribble::backend::error::BackendError;
///
/// let err = BackendError::bad_request("email must contain '@'");
/// assert_eq!(err.status_code().as_u16(), 400);
///
/// let err = BackendError::unauthenticated();
/// assert_eq!(err.message(), "unauthenticated");
/// ```
#[derive(Debug, Error)]
pub enum BackendError {
    /// The request body or parameters are invalid
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Credentials are missing, malformed or fail verification
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    /// The caller is authenticated but may not act on this resource
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Any other server-side failure
    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl BackendError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    /// The uniform verification failure. Never says why.
    pub fn unauthenticated() -> Self {
        Self::Unauthenticated("unauthenticated".to_string())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Get the HTTP status code for this error
    ///
    /// # Status Code Mapping
    ///
    /// - `BadRequest`, `Credential(TooLong)` - 400
    /// - `Unauthenticated` - 401
    /// - `Forbidden` - 403
    /// - `NotFound`, `Store(NotFound)` - 404
    /// - `Conflict`, `Store(Conflict)` - 409
    /// - `Internal`, `Credential(Hashing)`, `Token`, `Store(Backend)` - 500
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Store(err) => match err {
                StoreError::NotFound => StatusCode::NOT_FOUND,
                StoreError::Conflict(_) => StatusCode::CONFLICT,
                StoreError::Backend(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Credential(CredentialError::TooLong { .. }) => StatusCode::BAD_REQUEST,
            Self::Internal(_) | Self::Credential(CredentialError::Hashing(_)) | Self::Token(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get the client-facing error message
    ///
    /// Internal failures are reduced to a generic message. The full error is
    /// still available through `Display` for logging.
    pub fn message(&self) -> String {
        match self {
            Self::BadRequest(message)
            | Self::Unauthenticated(message)
            | Self::Forbidden(message)
            | Self::NotFound(message)
            | Self::Conflict(message) => message.clone(),
            Self::Store(StoreError::NotFound) => "user not found".to_string(),
            Self::Store(err @ StoreError::Conflict(_)) => err.to_string(),
            Self::Credential(err @ CredentialError::TooLong { .. }) => err.to_string(),
            Self::Internal(_)
            | Self::Credential(CredentialError::Hashing(_))
            | Self::Token(_)
            | Self::Store(StoreError::Backend(_)) => INTERNAL_MESSAGE.to_string(),
        }
    }
}
