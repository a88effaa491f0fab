//! Server Module
//!
//! This module initializes and configures the Axum HTTP server.
//!
//! # Architecture
//!
//! - **`state`** - Application state structure and `FromRef` implementations
//! - **`config`** - Configuration loading and validation
//! - **`init`** - State construction and app creation
//!
//! # Module Structure
//!
//! ```text
//! server/
//! ├── mod.rs          - Module exports and documentation
//! ├── state.rs        - AppState and FromRef implementations
//! ├── config.rs       - Configuration loading (secrets, port, TTLs)
//! └── init.rs         - Server initialization and app creation
//! ```
//!
//! # Initialization Flow
//!
//! 1. **Configuration Loading**: `ServerConfig::from_env` reads the secrets
//!    and optional settings; a missing secret stops startup
//! 2. **State Creation**: token service, identity store and hub handle
//! 3. **Router Creation**: public and gated routes plus tracing
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tribble::backend::auth::users::InMemoryUserStore;
//! use tribble::backend::server::{create_app, ServerConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServerConfig::builder("access-secret", "refresh-secret").build()?;
//! let app = create_app(&config, Arc::new(InMemoryUserStore::new()));
//! # Ok(())
//! # }
//! ```

/// Application state management
pub mod state;

/// Server configuration loading
pub mod config;

/// Server initialization
pub mod init;

// Re-export commonly used types
pub use config::{ConfigError, ServerConfig};
pub use init::{build_state, create_app};
pub use state::AppState;
