/**
 * Authentication Handler Types
 *
 * This module defines the request and response types used by the auth and
 * account handlers.
 */

use serde::{Deserialize, Serialize};

use crate::backend::auth::password::MAX_PASSWORD_BYTES;
use crate::backend::auth::sessions::TokenPair;
use crate::backend::auth::users::User;

/// Registration request
#[derive(Deserialize, Serialize, Debug)]
pub struct RegisterRequest {
    /// Display name
    pub name: String,
    /// User's email address (stored lowercased)
    pub email: String,
    /// User's password (will be hashed before storage)
    pub password: String,
}

impl RegisterRequest {
    /// Check the request fields, returning the first problem found.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.name.trim().is_empty() {
            return Err("name must not be empty");
        }
        if !self.email.contains('@') {
            return Err("email must contain '@'");
        }
        if self.password.is_empty() {
            return Err("password must not be empty");
        }
        if self.password.len() > MAX_PASSWORD_BYTES {
            return Err("password is too long");
        }
        Ok(())
    }
}

/// Login request
#[derive(Deserialize, Serialize, Debug)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Refresh exchange request
///
/// `id` must name the same user as the refresh token's subject.
#[derive(Deserialize, Serialize, Debug)]
pub struct RefreshRequest {
    pub id: String,
    pub token: String,
}

/// Password change request for the calling user
#[derive(Deserialize, Serialize, Debug)]
pub struct PasswordUpdateRequest {
    pub password: String,
}

/// Profile change request for the calling user
///
/// Either field may be left out; at least one must be present.
#[derive(Deserialize, Serialize, Debug, Default)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl UpdateUserRequest {
    /// Check the request fields, returning the first problem found.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.name.is_none() && self.email.is_none() {
            return Err("nothing to update");
        }
        if self.name.as_deref().is_some_and(|name| name.trim().is_empty()) {
            return Err("name must not be empty");
        }
        if self.email.as_deref().is_some_and(|email| !email.contains('@')) {
            return Err("email must contain '@'");
        }
        Ok(())
    }
}

/// Auth response
///
/// Returned by register and login. Contains the token pair and user
/// information for immediate authentication.
#[derive(Serialize, Deserialize, Debug)]
pub struct AuthResponse {
    pub message: String,
    pub user: UserResponse,
    /// `accessToken` and `refreshToken`, flattened into the top level
    #[serde(flatten)]
    pub tokens: TokenPair,
}

/// User response (without sensitive data)
///
/// Does not include the password hash.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}

/// Response for `GET /users`
#[derive(Serialize, Deserialize, Debug)]
pub struct UsersResponse {
    pub message: String,
    pub users: Vec<UserResponse>,
}

/// Response for `PUT /users`
#[derive(Serialize, Deserialize, Debug)]
pub struct UserUpdatedResponse {
    pub message: String,
    pub user: UserResponse,
}

/// Plain acknowledgement body
#[derive(Serialize, Deserialize, Debug)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
