/**
 * Server Configuration
 *
 * This module handles loading and validation of server configuration.
 *
 * # Configuration Sources
 *
 * Configuration is read from environment variables. The server binary loads
 * a `.env` file into the environment first if one is present:
 *
 * | Variable                 | Required | Default  |
 * |--------------------------|----------|----------|
 * | `TOKEN_SECRET`           | yes      |          |
 * | `REFRESH_TOKEN_SECRET`   | yes      |          |
 * | `SERVER_PORT`            | no       | `8080`   |
 * | `ACCESS_TOKEN_TTL_SECS`  | no       | `900`    |
 * | `REFRESH_TOKEN_TTL_SECS` | no       | `604800` |
 * | `WS_OUTBOUND_CAPACITY`   | no       | `256`    |
 *
 * # Error Handling
 *
 * Unlike optional services, the signing secrets are mandatory: a missing or
 * empty secret is a fatal `ConfigError` and the server must not start.
 */

use thiserror::Error;

use crate::backend::auth::sessions::{
    SecretPair, TokenService, ACCESS_TOKEN_TTL_SECS, REFRESH_TOKEN_TTL_SECS,
};
use crate::backend::realtime::hub::DEFAULT_OUTBOUND_CAPACITY;

pub const TOKEN_SECRET_VAR: &str = "TOKEN_SECRET";
pub const REFRESH_TOKEN_SECRET_VAR: &str = "REFRESH_TOKEN_SECRET";
pub const SERVER_PORT_VAR: &str = "SERVER_PORT";
pub const ACCESS_TTL_VAR: &str = "ACCESS_TOKEN_TTL_SECS";
pub const REFRESH_TTL_VAR: &str = "REFRESH_TOKEN_TTL_SECS";
pub const OUTBOUND_CAPACITY_VAR: &str = "WS_OUTBOUND_CAPACITY";

pub const DEFAULT_PORT: u16 = 8080;

/// Configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A signing secret is absent or empty
    #[error("{0} must be set to a non-empty value")]
    MissingSecret(&'static str),

    /// An optional setting is present but unusable
    #[error("invalid value {value:?} for {name}: {reason}")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub secrets: SecretPair,
    pub port: u16,
    pub access_ttl_secs: i64,
    pub refresh_ttl_secs: i64,
    /// Per-connection outbound queue length on the WebSocket hub
    pub outbound_capacity: usize,
}

impl ServerConfig {
    /// Start building a configuration from the two signing secrets.
    pub fn builder(
        access_secret: impl Into<String>,
        refresh_secret: impl Into<String>,
    ) -> ServerConfigBuilder {
        ServerConfigBuilder {
            access_secret: access_secret.into(),
            refresh_secret: refresh_secret.into(),
            port: DEFAULT_PORT,
            access_ttl_secs: ACCESS_TOKEN_TTL_SECS,
            refresh_ttl_secs: REFRESH_TOKEN_TTL_SECS,
            outbound_capacity: DEFAULT_OUTBOUND_CAPACITY,
        }
    }

    /// Load configuration from the process environment.
    ///
    /// The server binary loads `.env` into the environment before calling this.
    ///
    /// # Errors
    ///
    /// * `ConfigError::MissingSecret` - a signing secret is missing or empty
    /// * `ConfigError::InvalidValue` - an optional value cannot be parsed or
    ///   is out of range
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let access_secret = required_secret(&lookup, TOKEN_SECRET_VAR)?;
        let refresh_secret = required_secret(&lookup, REFRESH_TOKEN_SECRET_VAR)?;

        let mut builder = Self::builder(access_secret, refresh_secret);

        if let Some(port) = optional::<u16, _>(&lookup, SERVER_PORT_VAR)? {
            builder = builder.port(port);
        }
        if let Some(ttl) = optional::<i64, _>(&lookup, ACCESS_TTL_VAR)? {
            builder = builder.access_ttl_secs(ttl);
        }
        if let Some(ttl) = optional::<i64, _>(&lookup, REFRESH_TTL_VAR)? {
            builder = builder.refresh_ttl_secs(ttl);
        }
        if let Some(capacity) = optional::<usize, _>(&lookup, OUTBOUND_CAPACITY_VAR)? {
            builder = builder.outbound_capacity(capacity);
        }

        builder.build()
    }

    /// Build the token service described by this configuration.
    pub fn token_service(&self) -> TokenService {
        TokenService::new(&self.secrets, self.access_ttl_secs, self.refresh_ttl_secs)
    }
}

/// Builder for `ServerConfig`
#[derive(Debug, Clone)]
pub struct ServerConfigBuilder {
    access_secret: String,
    refresh_secret: String,
    port: u16,
    access_ttl_secs: i64,
    refresh_ttl_secs: i64,
    outbound_capacity: usize,
}

impl ServerConfigBuilder {
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn access_ttl_secs(mut self, ttl: i64) -> Self {
        self.access_ttl_secs = ttl;
        self
    }

    pub fn refresh_ttl_secs(mut self, ttl: i64) -> Self {
        self.refresh_ttl_secs = ttl;
        self
    }

    pub fn outbound_capacity(mut self, capacity: usize) -> Self {
        self.outbound_capacity = capacity;
        self
    }

    /// Validate and build the configuration.
    pub fn build(self) -> Result<ServerConfig, ConfigError> {
        if self.access_secret.is_empty() {
            return Err(ConfigError::MissingSecret(TOKEN_SECRET_VAR));
        }
        if self.refresh_secret.is_empty() {
            return Err(ConfigError::MissingSecret(REFRESH_TOKEN_SECRET_VAR));
        }
        positive(ACCESS_TTL_VAR, self.access_ttl_secs)?;
        positive(REFRESH_TTL_VAR, self.refresh_ttl_secs)?;
        if self.outbound_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                name: OUTBOUND_CAPACITY_VAR,
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(ServerConfig {
            secrets: SecretPair::new(self.access_secret, self.refresh_secret),
            port: self.port,
            access_ttl_secs: self.access_ttl_secs,
            refresh_ttl_secs: self.refresh_ttl_secs,
            outbound_capacity: self.outbound_capacity,
        })
    }
}

fn required_secret<F>(lookup: &F, name: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ConfigError::MissingSecret(name)),
    }
}

fn optional<T, F>(lookup: &F, name: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(name) else {
        return Ok(None);
    };

    raw.trim()
        .parse::<T>()
        .map(Some)
        .map_err(|e| ConfigError::InvalidValue {
            name,
            value: raw.clone(),
            reason: e.to_string(),
        })
}

fn positive(name: &'static str, ttl: i64) -> Result<(), ConfigError> {
    if ttl > 0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            name,
            value: ttl.to_string(),
            reason: "must be a positive number of seconds".to_string(),
        })
    }
}
