/**
 * Account Handlers
 *
 * Handlers for the gated account endpoints:
 *
 * - `GET /me` - the verified claims of the caller
 * - `GET /users` - public view of every user
 * - `PUT /users` - change the caller's name or email
 * - `GET /users/{id}` - public view of any user
 * - `PUT /users/password` - change the caller's password
 * - `DELETE /users/{id}` - delete the caller's own account
 *
 * All of these sit behind the auth gate and read the caller's identity from
 * the `AuthUser` extractor. Changing the password, name or email does not
 * invalidate tokens that were already issued; the next refresh exchange
 * picks up the new profile.
 */

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};

use crate::backend::auth::handlers::types::{
    MessageResponse, PasswordUpdateRequest, UpdateUserRequest, UserResponse, UserUpdatedResponse,
    UsersResponse,
};
use crate::backend::auth::handlers::{hash_off_thread, json_body};
use crate::backend::auth::sessions::AccessClaims;
use crate::backend::auth::users::{ProfileUpdate, SharedUserStore, UserStore};
use crate::backend::error::BackendError;
use crate::backend::middleware::auth::AuthUser;

/// Get current user handler
///
/// Returns the claims the gate verified, without a storage round-trip.
pub async fn get_me(AuthUser(claims): AuthUser) -> Json<AccessClaims> {
    Json(claims)
}

/// List every user
pub async fn list_users(
    State(users): State<SharedUserStore>,
) -> Result<Json<UsersResponse>, BackendError> {
    let all = users.list().await?;

    Ok(Json(UsersResponse {
        message: "users found".to_string(),
        users: all.into_iter().map(UserResponse::from).collect(),
    }))
}

/// Change the caller's name and/or email
///
/// # Errors
///
/// * `400 Bad Request` - Malformed body, no fields, an empty name or an email
///   without `@`
/// * `404 Not Found` - The caller's account no longer exists
/// * `409 Conflict` - The new email belongs to another user
pub async fn update_user(
    State(users): State<SharedUserStore>,
    AuthUser(claims): AuthUser,
    body: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<Json<UserUpdatedResponse>, BackendError> {
    let request = json_body(body)?;
    request.validate().map_err(BackendError::bad_request)?;

    let changes = ProfileUpdate {
        name: request.name.map(|name| name.trim().to_string()),
        email: request.email,
    };
    let user = users.update(&claims.sub, changes).await?;

    tracing::info!("Profile updated for user {}", user.id);

    Ok(Json(UserUpdatedResponse {
        message: "user updated".to_string(),
        user: user.into(),
    }))
}

/// Get a user by ID
///
/// # Errors
///
/// * `404 Not Found` - No user with this ID
pub async fn get_user(
    State(users): State<SharedUserStore>,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, BackendError> {
    let user = users
        .find_by_id(&id)
        .await?
        .ok_or_else(|| BackendError::not_found("user not found"))?;

    Ok(Json(user.into()))
}

/// Change the caller's password
///
/// # Errors
///
/// * `400 Bad Request` - Malformed body, or a password that is empty or too
///   long to hash
/// * `404 Not Found` - The caller's account no longer exists
pub async fn update_password(
    State(users): State<SharedUserStore>,
    AuthUser(claims): AuthUser,
    body: Result<Json<PasswordUpdateRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, BackendError> {
    let request = json_body(body)?;
    if request.password.is_empty() {
        return Err(BackendError::bad_request("password must not be empty"));
    }

    let password_hash = hash_off_thread(request.password).await?;
    users.update_password(&claims.sub, password_hash).await?;

    tracing::info!("Password updated for user {}", claims.sub);

    Ok(Json(MessageResponse::new("password updated")))
}

/// Delete the caller's account
///
/// # Errors
///
/// * `403 Forbidden` - `id` is not the caller's own ID
/// * `404 Not Found` - The account no longer exists
pub async fn delete_user(
    State(users): State<SharedUserStore>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, BackendError> {
    if id != claims.sub {
        tracing::warn!("User {} tried to delete account {}", claims.sub, id);
        return Err(BackendError::forbidden("cannot delete another user's account"));
    }

    users.delete(&id).await?;

    tracing::info!("User deleted: {}", id);

    Ok(Json(MessageResponse::new("user deleted")))
}
