/**
 * Application State Management
 *
 * This module defines the application state structure and implements the
 * `FromRef` traits for Axum state extraction.
 *
 * # Architecture
 *
 * `AppState` holds:
 * - The token service (immutable after startup)
 * - The identity store behind `Arc<dyn UserStore>`
 * - The realtime state: a handle to the hub actor and the per-connection
 *   queue length
 *
 * # Thread Safety
 *
 * Every field is cheap to clone and safe to share. The hub's membership set
 * is not part of this state at all; it lives inside the hub task.
 *
 * # Example
 *
 * ```rust,ignore
 * use axum::extract::State;
 * use tribble::backend::auth::sessions::TokenService;
 *
 * async fn handler(State(tokens): State<TokenService>) {
 *     // ...
 * }
 * ```
 */

use axum::extract::FromRef;

use crate::backend::auth::sessions::TokenService;
use crate::backend::auth::users::SharedUserStore;
use crate::backend::realtime::socket::RealtimeState;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub tokens: TokenService,
    pub users: SharedUserStore,
    pub realtime: RealtimeState,
}

impl FromRef<AppState> for TokenService {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.tokens.clone()
    }
}

impl FromRef<AppState> for SharedUserStore {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.users.clone()
    }
}

impl FromRef<AppState> for RealtimeState {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.realtime.clone()
    }
}
