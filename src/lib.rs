//! Tribble - Main Library
//!
//! Tribble is the server core of a small multi-tenant chat backend. It owns the
//! two pieces of the system that carry real invariants: token-based
//! authentication and the real-time broadcast hub behind the chat WebSocket.
//!
//! # Overview
//!
//! This library provides:
//! - One-way password hashing and verification (bcrypt)
//! - Signed, time-bounded access and refresh tokens (HS256 JWT)
//! - A request gate that admits or rejects requests based on bearer tokens
//! - A single-owner hub actor that fans real-time frames out to every
//!   connected client, disconnecting slow consumers instead of blocking
//!
//! Chat and message persistence, file storage and geocoding are external
//! collaborators and are not part of this crate.
//!
//! # Module Structure
//!
//! - **`backend`** - Server-side code (only compiled with `ssr` feature)
//!   - `auth` - credential hashing, token service, identity storage, handlers
//!   - `middleware` - the bearer-token gate
//!   - `realtime` - hub actor, connection pumps, WebSocket endpoint
//!   - `server` - configuration, application state, app construction
//!   - `routes` - router assembly
//!   - `error` - error taxonomy and HTTP mapping
//!
//! # Feature Flags
//!
//! - **`ssr`** (default) - enables the backend modules and the server binary
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tribble::backend::auth::users::InMemoryUserStore;
//! use tribble::backend::server::{config::ServerConfig, init::create_app};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServerConfig::from_env()?;
//! let app = create_app(&config, Arc::new(InMemoryUserStore::new()));
//! let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Thread Safety
//!
//! - The token service is immutable after construction and freely cloned
//!   across request tasks.
//! - The hub's membership set is owned by exactly one task; everything else
//!   talks to it through channels.

/// Backend server-side code
#[cfg(feature = "ssr")]
pub mod backend;
