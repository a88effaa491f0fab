/**
 * Server Initialization
 *
 * This module builds the application state and the router from a loaded
 * configuration.
 *
 * # Initialization Process
 *
 * 1. Build the token service from the secret pair and TTLs
 * 2. Spawn the hub actor
 * 3. Assemble `AppState` around the supplied identity store
 * 4. Create and configure the router
 *
 * Must be called from within a Tokio runtime, since the hub is spawned here.
 */

use axum::Router;

use crate::backend::auth::users::SharedUserStore;
use crate::backend::realtime::hub::Hub;
use crate::backend::realtime::socket::RealtimeState;
use crate::backend::routes::router::create_router;
use crate::backend::server::config::ServerConfig;
use crate::backend::server::state::AppState;

/// Build the application state and start the hub.
pub fn build_state(config: &ServerConfig, users: SharedUserStore) -> AppState {
    let tokens = config.token_service();
    let hub = Hub::spawn();

    tracing::info!(
        "Token service ready (access TTL {}s, refresh TTL {}s)",
        tokens.access_ttl(),
        tokens.refresh_ttl()
    );

    AppState {
        tokens,
        users,
        realtime: RealtimeState {
            hub,
            outbound_capacity: config.outbound_capacity,
        },
    }
}

/// Create and configure the Axum application
///
/// # Returns
///
/// Configured Axum Router ready to serve requests
pub fn create_app(config: &ServerConfig, users: SharedUserStore) -> Router<()> {
    tracing::info!("Initializing Tribble backend server");
    create_router(build_state(config, users))
}
