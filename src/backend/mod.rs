//! Backend Module
//!
//! This module contains all server-side code for Tribble. It provides an Axum
//! HTTP server with bearer-token authentication and a WebSocket broadcast hub.
//!
//! This module is only compiled when the `ssr` feature is enabled.
//!
//! # Architecture
//!
//! The backend is organized into focused submodules:
//!
//! - **`server`** - Configuration, application state, app construction
//! - **`routes`** - HTTP route configuration and router assembly
//! - **`auth`** - Password hashing, JWT tokens, user storage, auth handlers
//! - **`middleware`** - The bearer-token gate
//! - **`realtime`** - Hub actor and per-connection pumps
//! - **`error`** - Backend-specific error types
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs          - Module exports and documentation
//! ├── server/         - Configuration, state and initialization
//! ├── routes/         - Route configuration
//! ├── auth/           - Authentication
//! ├── middleware/     - Request middleware
//! ├── realtime/       - WebSocket hub and connection pumps
//! └── error/          - Error types
//! ```
//!
//! # State Management
//!
//! The backend shares one `AppState` across all handlers. It holds:
//! - The token service (immutable, built from the secret pair at startup)
//! - The user storage collaborator behind an `Arc<dyn UserStore>`
//! - A handle to the hub actor
//!
//! Handlers extract only the part they need through `FromRef`.
//!
//! # Error Handling
//!
//! Handlers return `BackendError`, which maps each failure to an HTTP status
//! code and a JSON body. Token verification failures collapse into a single
//! "unauthenticated" outcome.

/// Server setup and configuration
pub mod server;

/// Route configuration
pub mod routes;

/// Real-time broadcast hub
pub mod realtime;

/// Backend error types
pub mod error;

/// Authentication and user management
pub mod auth;

/// Middleware for request processing
pub mod middleware;

/// Re-export commonly used types
pub use error::BackendError;
pub use realtime::{Hub, HubHandle};
pub use server::{create_app, AppState, ServerConfig};
