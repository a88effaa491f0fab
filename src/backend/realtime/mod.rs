//! Real-time Broadcast Module
//!
//! This module provides the WebSocket transport behind chat: every frame a
//! client sends is fanned out to every connected client.
//!
//! # Architecture
//!
//! - **`hub`** - The hub actor owning the membership set
//! - **`client`** - Per-connection read and write pumps
//! - **`socket`** - The `GET /ws` upgrade handler
//!
//! # Module Structure
//!
//! ```text
//! realtime/
//! ├── mod.rs     - Module exports and documentation
//! ├── hub.rs     - Hub actor, handle, registration guard
//! ├── client.rs  - Read/write pumps and connection driver
//! └── socket.rs  - WebSocket upgrade handler
//! ```
//!
//! # Connection Lifecycle
//!
//! 1. The gated `/ws` route upgrades the request
//! 2. The connection registers with the hub and gets a bounded outbound queue
//! 3. The read pump broadcasts inbound frames, the write pump drains the queue
//! 4. A read error, close frame or full queue removes the connection from the
//!    hub, which closes its queue and ends both pumps
//!
//! # Example
//!
//! ```rust,no_run
//! use tribble::backend::realtime::{Connection, Hub, Payload};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let hub = Hub::spawn();
//! let (connection, mut outbound) = Connection::new(256);
//! let _registration = hub.register(connection).await?;
//!
//! hub.broadcast(Payload::text("hello")).await?;
//! assert_eq!(outbound.recv().await, Some(Payload::text("hello")));
//! # Ok(())
//! # }
//! ```

/// Hub actor
pub mod hub;

/// Connection pumps
pub mod client;

/// WebSocket upgrade handler
pub mod socket;

// Re-export commonly used types
pub use client::{serve_connection, ConnectionError};
pub use hub::{Connection, ConnectionId, Hub, HubError, HubHandle, Payload, Registration};
pub use socket::{ws_handler, RealtimeState};
