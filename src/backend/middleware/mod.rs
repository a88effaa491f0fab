//! Middleware Module
//!
//! This module contains HTTP middleware for the backend server.
//!
//! - **`auth`** - The bearer-token gate and the `AuthUser` extractor
//!
//! # Example
//!
//! ```rust,no_run
//! use axum::{middleware::from_fn_with_state, routing::get, Router};
//! use tribble::backend::auth::sessions::{SecretPair, TokenService};
//! use tribble::backend::middleware::{auth_middleware, AuthUser};
//!
//! let tokens = TokenService::with_default_ttls(&SecretPair::new("a", "r"));
//! let app: Router = Router::new()
//!     .route("/me", get(|AuthUser(claims): AuthUser| async move { claims.sub }))
//!     .route_layer(from_fn_with_state(tokens, auth_middleware));
//! ```

pub mod auth;

pub use auth::{auth_middleware, evaluate, AuthUser, GateDecision, GateRejection};
