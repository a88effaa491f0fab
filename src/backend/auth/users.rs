/**
 * User Model and Identity Storage
 *
 * This module defines the stored user record and the `UserStore` trait that
 * the HTTP handlers talk to. Persistence is an external collaborator; the
 * in-memory implementation here backs the server binary and the tests.
 *
 * Emails are stored and looked up in lowercase, so `Ada@Example.com` and
 * `ada@example.com` are the same account.
 */

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;

/// User record as held by the identity store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Opaque user ID (`u_<uuid>`)
    pub id: String,
    /// Display name
    pub name: String,
    /// Lowercased email address, unique across users
    pub email: String,
    /// bcrypt hash of the password
    pub password_hash: String,
}

impl User {
    /// Build a new user record with a fresh ID. The email is lowercased.
    pub fn new(name: impl Into<String>, email: &str, password_hash: String) -> Self {
        Self {
            id: new_user_id(),
            name: name.into(),
            email: normalize_email(email),
            password_hash,
        }
    }
}

/// Generate a new opaque user ID.
pub fn new_user_id() -> String {
    format!("u_{}", uuid::Uuid::new_v4())
}

/// Canonical form of an email address for storage and lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Identity store errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("user not found")]
    NotFound,

    #[error("a user with email {0} already exists")]
    Conflict(String),

    /// The backing store failed
    #[error("user store failure: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Profile fields to change on an existing user. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Identity storage collaborator
///
/// Implementations must be safe to share across request tasks.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Look up a user by email (case-insensitive).
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Look up a user by ID.
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<User>>;

    /// Insert a new user. Fails with `Conflict` if the email is taken.
    async fn create(&self, user: User) -> StoreResult<User>;

    /// All users, ordered by email.
    async fn list(&self) -> StoreResult<Vec<User>>;

    /// Change a user's name and/or email and return the updated record.
    ///
    /// Fails with `NotFound` if the ID is unknown and with `Conflict` if the
    /// new email belongs to another user.
    async fn update(&self, id: &str, changes: ProfileUpdate) -> StoreResult<User>;

    /// Replace a user's password hash.
    async fn update_password(&self, id: &str, password_hash: String) -> StoreResult<()>;

    /// Remove a user. Fails with `NotFound` if the ID is unknown.
    async fn delete(&self, id: &str) -> StoreResult<()>;
}

/// Shared handle to the identity store, as held in application state
pub type SharedUserStore = Arc<dyn UserStore>;

#[derive(Default)]
struct Users {
    by_id: HashMap<String, User>,
    id_by_email: HashMap<String, String>,
}

/// Process-local `UserStore`. Contents are lost on restart.
#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<Users>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users
    pub async fn len(&self) -> usize {
        self.users.read().await.by_id.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .id_by_email
            .get(&normalize_email(email))
            .and_then(|id| users.by_id.get(id))
            .cloned())
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<User>> {
        Ok(self.users.read().await.by_id.get(id).cloned())
    }

    async fn create(&self, mut user: User) -> StoreResult<User> {
        user.email = normalize_email(&user.email);

        let mut users = self.users.write().await;
        if users.id_by_email.contains_key(&user.email) {
            return Err(StoreError::Conflict(user.email));
        }
        if users.by_id.contains_key(&user.id) {
            return Err(StoreError::Backend(format!("duplicate user id {}", user.id)));
        }

        users.id_by_email.insert(user.email.clone(), user.id.clone());
        users.by_id.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn list(&self) -> StoreResult<Vec<User>> {
        let mut all: Vec<User> = self.users.read().await.by_id.values().cloned().collect();
        all.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(all)
    }

    async fn update(&self, id: &str, changes: ProfileUpdate) -> StoreResult<User> {
        let mut users = self.users.write().await;
        let current_email = users
            .by_id
            .get(id)
            .map(|user| user.email.clone())
            .ok_or(StoreError::NotFound)?;

        let new_email = changes.email.as_deref().map(normalize_email);
        if let Some(email) = &new_email {
            if users.id_by_email.get(email).is_some_and(|owner| owner != id) {
                return Err(StoreError::Conflict(email.clone()));
            }
        }

        if let Some(email) = new_email {
            users.id_by_email.remove(&current_email);
            users.id_by_email.insert(email.clone(), id.to_string());
            if let Some(user) = users.by_id.get_mut(id) {
                user.email = email;
            }
        }

        let user = users.by_id.get_mut(id).ok_or(StoreError::NotFound)?;
        if let Some(name) = changes.name {
            user.name = name;
        }
        Ok(user.clone())
    }

    async fn update_password(&self, id: &str, password_hash: String) -> StoreResult<()> {
        let mut users = self.users.write().await;
        let user = users.by_id.get_mut(id).ok_or(StoreError::NotFound)?;
        user.password_hash = password_hash;
        Ok(())
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        let mut users = self.users.write().await;
        let user = users.by_id.remove(id).ok_or(StoreError::NotFound)?;
        users.id_by_email.remove(&user.email);
        Ok(())
    }
}
