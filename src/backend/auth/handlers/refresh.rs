/**
 * Refresh Exchange Handler
 *
 * POST /refresh-token trades a valid refresh token for a brand-new access +
 * refresh pair. This is the only way to get new tokens without a password.
 *
 * The route is not behind the access-token gate: the refresh token in the
 * body is the credential. The `id` in the body must match the token's
 * subject, and the user must still exist.
 */

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use chrono::Utc;

use crate::backend::auth::handlers::json_body;
use crate::backend::auth::handlers::types::RefreshRequest;
use crate::backend::auth::sessions::{TokenPair, TokenService};
use crate::backend::auth::users::{SharedUserStore, UserStore};
use crate::backend::error::BackendError;

/// Refresh exchange handler
///
/// # Errors
///
/// * `400 Bad Request` - Malformed body or empty fields
/// * `401 Unauthorized` - Invalid or expired refresh token, subject mismatch,
///   or the user no longer exists
pub async fn refresh_token(
    State(users): State<SharedUserStore>,
    State(tokens): State<TokenService>,
    body: Result<Json<RefreshRequest>, JsonRejection>,
) -> Result<Json<TokenPair>, BackendError> {
    let request = json_body(body)?;
    if request.id.is_empty() || request.token.is_empty() {
        return Err(BackendError::bad_request("bad request"));
    }

    let claims = tokens
        .verify_refresh(&request.token)
        .ok_or_else(BackendError::unauthenticated)?;

    if claims.sub != request.id {
        tracing::warn!("Refresh token subject does not match requested id {}", request.id);
        return Err(BackendError::unauthenticated());
    }

    let user = users.find_by_id(&claims.sub).await?.ok_or_else(|| {
        tracing::warn!("Refresh for deleted user {}", claims.sub);
        BackendError::unauthenticated()
    })?;

    let pair = tokens.issue_pair(&user.id, &user.name, &user.email, Utc::now().timestamp())?;

    tracing::info!("Token pair refreshed for user {}", user.id);

    Ok(Json(pair))
}
