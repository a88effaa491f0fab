//! Route Configuration Module
//!
//! This module configures all HTTP routes for the backend server.
//!
//! - **`router`** - Main router creation and route assembly
//! - **`api_routes`** - Gated and open route groups, health check
//!
//! # Module Structure
//!
//! ```text
//! routes/
//! ├── mod.rs          - Module exports and documentation
//! ├── router.rs       - Main router creation
//! └── api_routes.rs   - Route groups
//! ```
//!
//! # Route Types
//!
//! ## Gated
//!
//! - `POST /register`, `POST /login` - pass the gate by path prefix
//! - `GET /me`, `GET /users`, `PUT /users`, `GET /users/{id}`,
//!   `PUT /users/password`, `DELETE /users/{id}`, `GET /ws`, `GET /health` -
//!   need `Authorization: Bearer <token>`
//!
//! ## Open
//!
//! - `POST /refresh-token` - authorized by the refresh token in the body

/// Main router creation
pub mod router;

/// Route groups
pub mod api_routes;

// Re-export commonly used functions
pub use router::create_router;
