/**
 * API Route Configuration
 *
 * # Routes
 *
 * ## Gate-checked
 * - `POST /register` - User registration (public prefix, passes the gate)
 * - `POST /login` - User login (public prefix, passes the gate)
 * - `GET /me` - Claims of the calling user
 * - `GET /users` - Public view of every user
 * - `PUT /users` - Change the caller's name or email
 * - `GET /users/{id}` - Public view of a user
 * - `DELETE /users/{id}` - Delete the caller's own account
 * - `PUT /users/password` - Change the caller's password
 * - `GET /ws` - WebSocket upgrade into the broadcast hub
 * - `GET /health` - Liveness and live connection count
 *
 * ## Outside the gate
 * - `POST /refresh-token` - Refresh exchange, authorized by the refresh
 *   token in its body
 */

use axum::{
    extract::State,
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Json, Router,
};
use serde::Serialize;

use crate::backend::auth::handlers::{
    delete_user, get_me, get_user, list_users, login, refresh_token, register, update_password,
    update_user,
};
use crate::backend::middleware::auth::auth_middleware;
use crate::backend::realtime::socket::{ws_handler, RealtimeState};
use crate::backend::server::state::AppState;

/// Health check body
#[derive(Serialize, Debug)]
pub struct HealthResponse {
    pub status: &'static str,
    /// Live hub members
    pub connections: usize,
}

/// Health check handler (GET /health)
pub async fn health(State(realtime): State<RealtimeState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        connections: realtime.hub.member_count(),
    })
}

/// Routes that run through the auth gate
///
/// The gate is attached with `route_layer`, so it only runs for requests
/// that match one of these routes. `/register` and `/login` pass it by
/// prefix.
pub fn configure_gated_routes(app_state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(get_me))
        .route("/users", get(list_users).put(update_user))
        .route("/users/password", put(update_password))
        .route("/users/{id}", get(get_user).delete(delete_user))
        .route("/ws", get(ws_handler))
        .route("/health", get(health))
        .route_layer(from_fn_with_state(app_state.clone(), auth_middleware))
}

/// Routes that never see the auth gate
pub fn configure_open_routes() -> Router<AppState> {
    Router::new().route("/refresh-token", post(refresh_token))
}
