/**
 * WebSocket Endpoint
 *
 * Handler for `GET /ws`. The route sits behind the auth gate, so only
 * callers holding a valid access token reach the upgrade. After the upgrade
 * the socket joins the hub and every data frame it sends is broadcast to all
 * members, the sender included.
 */

use axum::{
    extract::{State, WebSocketUpgrade},
    response::IntoResponse,
};

use crate::backend::middleware::auth::AuthUser;
use crate::backend::realtime::client::serve_connection;
use crate::backend::realtime::hub::HubHandle;

/// The slice of application state the WebSocket endpoint needs
#[derive(Debug, Clone)]
pub struct RealtimeState {
    pub hub: HubHandle,
    /// Outbound queue length for each new connection
    pub outbound_capacity: usize,
}

/// Upgrade handler for `GET /ws`
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(realtime): State<RealtimeState>,
    AuthUser(claims): AuthUser,
) -> impl IntoResponse {
    tracing::info!("WebSocket upgrade for user {}", claims.sub);

    ws.on_upgrade(move |socket| serve_connection(socket, realtime.hub, realtime.outbound_capacity))
}
