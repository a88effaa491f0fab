/**
 * Session Management and JWT Tokens
 *
 * This module issues and verifies the two token kinds that make up a login
 * session:
 *
 * - **access** tokens (short-lived) authorize ordinary API requests and carry
 *   the subject, display name and email
 * - **refresh** tokens (long-lived) are only good for minting a new pair and
 *   carry the subject and temporal fields only
 *
 * Each kind is signed with its own secret. Verification is stateless: a token
 * is valid when its HS256 signature matches, its `kind` is the expected one
 * and `now < exp`. There is no revocation list, so a leaked access token
 * stays usable until it expires.
 *
 * Every verification failure collapses to `None`. Callers cannot tell a bad
 * signature from an expired token, and neither can the client.
 */

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Access token lifetime (15 minutes)
pub const ACCESS_TOKEN_TTL_SECS: i64 = 15 * 60;

/// Refresh token lifetime (7 days)
pub const REFRESH_TOKEN_TTL_SECS: i64 = 7 * 24 * 60 * 60;

const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;

/// The two signing secrets, loaded once at startup.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretPair {
    access: String,
    refresh: String,
}

impl SecretPair {
    pub fn new(access: impl Into<String>, refresh: impl Into<String>) -> Self {
        Self {
            access: access.into(),
            refresh: refresh.into(),
        }
    }
}

impl fmt::Debug for SecretPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretPair")
            .field("access", &"<redacted>")
            .field("refresh", &"<redacted>")
            .finish()
    }
}

/// Token kind, embedded in every token as the `kind` claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Claims carried by an access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AccessClaims {
    /// User ID
    pub sub: String,
    /// Display name
    pub name: String,
    /// Email
    pub email: String,
    /// Always `TokenKind::Access` once issued
    pub kind: TokenKind,
    /// Issued at (Unix seconds)
    pub iat: i64,
    /// Expires at (Unix seconds)
    pub exp: i64,
}

impl AccessClaims {
    pub fn new(
        sub: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
        iat: i64,
        exp: i64,
    ) -> Self {
        Self {
            sub: sub.into(),
            name: name.into(),
            email: email.into(),
            kind: TokenKind::Access,
            iat,
            exp,
        }
    }
}

/// Claims carried by a refresh token. No name or email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RefreshClaims {
    /// User ID
    pub sub: String,
    /// Always `TokenKind::Refresh` once issued
    pub kind: TokenKind,
    /// Issued at (Unix seconds)
    pub iat: i64,
    /// Expires at (Unix seconds)
    pub exp: i64,
}

impl RefreshClaims {
    pub fn new(sub: impl Into<String>, iat: i64, exp: i64) -> Self {
        Self {
            sub: sub.into(),
            kind: TokenKind::Refresh,
            iat,
            exp,
        }
    }
}

/// A freshly minted access + refresh token pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    #[serde(rename = "accessToken")]
    pub access_token: String,
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
}

/// Token issuance errors
#[derive(Debug, Error)]
pub enum TokenError {
    /// `exp` is not strictly after `iat`
    #[error("token would expire at {exp} before or when it is issued at {iat}")]
    InvalidLifetime { iat: i64, exp: i64 },

    /// Signing failed inside the JWT library
    #[error("failed to sign token: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

struct SigningKeys {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
}

/// Issues and verifies access and refresh tokens.
///
/// Built once from the secret pair and cloned into every request task.
#[derive(Clone)]
pub struct TokenService {
    keys: Arc<SigningKeys>,
    validation: Validation,
    access_ttl: i64,
    refresh_ttl: i64,
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Create a token service with the given secrets and lifetimes (seconds).
    pub fn new(secrets: &SecretPair, access_ttl: i64, refresh_ttl: i64) -> Self {
        let keys = SigningKeys {
            access_encoding: EncodingKey::from_secret(secrets.access.as_bytes()),
            access_decoding: DecodingKey::from_secret(secrets.access.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(secrets.refresh.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(secrets.refresh.as_bytes()),
        };

        // Expiry is checked here with a strict `now < exp` and no leeway, so
        // the library's own check is turned off. Only HS256 headers pass.
        let mut validation = Validation::new(SIGNING_ALGORITHM);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.required_spec_claims =
            ["exp", "sub"].iter().map(|claim| claim.to_string()).collect::<HashSet<_>>();

        Self {
            keys: Arc::new(keys),
            validation,
            access_ttl,
            refresh_ttl,
        }
    }

    /// Create a token service with the default 15 minute / 7 day lifetimes.
    pub fn with_default_ttls(secrets: &SecretPair) -> Self {
        Self::new(secrets, ACCESS_TOKEN_TTL_SECS, REFRESH_TOKEN_TTL_SECS)
    }

    pub fn access_ttl(&self) -> i64 {
        self.access_ttl
    }

    pub fn refresh_ttl(&self) -> i64 {
        self.refresh_ttl
    }

    /// Sign an access token. The `kind` claim is always stamped as access.
    pub fn issue_access(&self, claims: &AccessClaims) -> Result<String, TokenError> {
        check_lifetime(claims.iat, claims.exp)?;
        let claims = AccessClaims {
            kind: TokenKind::Access,
            ..claims.clone()
        };
        Ok(encode(
            &Header::new(SIGNING_ALGORITHM),
            &claims,
            &self.keys.access_encoding,
        )?)
    }

    /// Sign a refresh token. The `kind` claim is always stamped as refresh.
    pub fn issue_refresh(&self, claims: &RefreshClaims) -> Result<String, TokenError> {
        check_lifetime(claims.iat, claims.exp)?;
        let claims = RefreshClaims {
            kind: TokenKind::Refresh,
            ..claims.clone()
        };
        Ok(encode(
            &Header::new(SIGNING_ALGORITHM),
            &claims,
            &self.keys.refresh_encoding,
        )?)
    }

    /// Mint a new access + refresh pair for a user, issued at `now`.
    pub fn issue_pair(
        &self,
        subject: &str,
        name: &str,
        email: &str,
        now: i64,
    ) -> Result<TokenPair, TokenError> {
        let access = AccessClaims::new(subject, name, email, now, now + self.access_ttl);
        let refresh = RefreshClaims::new(subject, now, now + self.refresh_ttl);

        Ok(TokenPair {
            access_token: self.issue_access(&access)?,
            refresh_token: self.issue_refresh(&refresh)?,
        })
    }

    /// Verify an access token against the wall clock.
    pub fn verify_access(&self, token: &str) -> Option<AccessClaims> {
        self.verify_access_at(token, Utc::now().timestamp())
    }

    /// Verify an access token as of `now` (Unix seconds).
    pub fn verify_access_at(&self, token: &str, now: i64) -> Option<AccessClaims> {
        let claims = decode::<AccessClaims>(token, &self.keys.access_decoding, &self.validation)
            .map_err(|e| tracing::debug!("Access token rejected: {}", e))
            .ok()?
            .claims;

        is_current(claims.kind, TokenKind::Access, claims.exp, now).then_some(claims)
    }

    /// Verify a refresh token against the wall clock.
    pub fn verify_refresh(&self, token: &str) -> Option<RefreshClaims> {
        self.verify_refresh_at(token, Utc::now().timestamp())
    }

    /// Verify a refresh token as of `now` (Unix seconds).
    pub fn verify_refresh_at(&self, token: &str, now: i64) -> Option<RefreshClaims> {
        let claims = decode::<RefreshClaims>(token, &self.keys.refresh_decoding, &self.validation)
            .map_err(|e| tracing::debug!("Refresh token rejected: {}", e))
            .ok()?
            .claims;

        is_current(claims.kind, TokenKind::Refresh, claims.exp, now).then_some(claims)
    }
}

fn check_lifetime(iat: i64, exp: i64) -> Result<(), TokenError> {
    if exp > iat {
        Ok(())
    } else {
        Err(TokenError::InvalidLifetime { iat, exp })
    }
}

fn is_current(kind: TokenKind, expected: TokenKind, exp: i64, now: i64) -> bool {
    if kind != expected {
        tracing::debug!("Token kind {:?} presented where {:?} is required", kind, expected);
        return false;
    }
    now < exp
}
