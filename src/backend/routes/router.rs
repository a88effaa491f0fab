/**
 * Router Configuration
 *
 * This module provides the main router creation function that combines
 * all route configurations into a single Axum router.
 */

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::backend::routes::api_routes::{configure_gated_routes, configure_open_routes};
use crate::backend::server::state::AppState;

/// Create the Axum router with all routes configured
///
/// 1. **Gated Routes**: auth, account, WebSocket and health endpoints behind the gate
/// 2. **Open Routes**: refresh exchange
/// 3. **Tracing**: one span per request via `tower-http`
///
/// Unknown paths fall through to Axum's default 404 without touching the
/// gate.
pub fn create_router(app_state: AppState) -> Router<()> {
    configure_gated_routes(&app_state)
        .merge(configure_open_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
