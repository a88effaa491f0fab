//! Authentication Module
//!
//! This module handles credential hashing, token issuance and verification,
//! identity storage and the HTTP handlers for the account endpoints.
//!
//! # Architecture
//!
//! - **`password`** - bcrypt hashing and verification
//! - **`sessions`** - access and refresh token service
//! - **`users`** - user record and the `UserStore` collaborator
//! - **`handlers`** - HTTP handlers for the auth and account endpoints
//!
//! # Module Structure
//!
//! ```text
//! auth/
//! ├── mod.rs          - Module exports and documentation
//! ├── password.rs     - Credential hashing
//! ├── sessions.rs     - Token service
//! ├── users.rs        - User model and storage trait
//! └── handlers/       - HTTP handlers
//!     ├── mod.rs      - Handler exports
//!     ├── types.rs    - Request/response types
//!     ├── register.rs - User registration handler
//!     ├── login.rs    - User authentication handler
//!     ├── refresh.rs  - Token refresh handler
//!     └── account.rs  - Current user and account management handlers
//! ```
//!
//! # Authentication Flow
//!
//! 1. **Register**: name, email and password → user stored → token pair returned
//! 2. **Login**: email and password verified → token pair returned
//! 3. **Refresh**: user ID and refresh token verified → new token pair returned
//! 4. **Gated requests**: access token in `Authorization: Bearer <token>`
//!
//! # Security
//!
//! - Passwords are hashed with bcrypt (cost 10) before storage
//! - Access tokens expire after 15 minutes, refresh tokens after 7 days
//! - Unknown email and wrong password produce the same 401 response
//! - Password hashes never leave the server

/// Credential hashing
pub mod password;

/// Token service
pub mod sessions;

/// User data model and storage
pub mod users;

/// HTTP handlers for authentication endpoints
pub mod handlers;

// Re-export commonly used types
pub use handlers::types::{AuthResponse, LoginRequest, RegisterRequest, UserResponse};
pub use sessions::{AccessClaims, RefreshClaims, SecretPair, TokenPair, TokenService};
pub use users::{InMemoryUserStore, ProfileUpdate, SharedUserStore, User, UserStore};
