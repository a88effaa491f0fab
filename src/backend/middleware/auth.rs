/**
 * Authentication Middleware
 *
 * This module gates requests on a bearer access token. Each request goes
 * through one of three outcomes:
 *
 * - **Public** - the path starts with `/register` or `/login`; no check
 * - **Admitted** - `Authorization: Bearer <token>` carries a valid access
 *   token; the verified claims are attached to the request extensions
 * - **Rejected** - 401 before any handler runs
 *
 * Rejections name only the coarse reason: a missing header, a header that is
 * not `Bearer <token>`, or a token that failed verification. Why a token
 * failed (signature, expiry, kind, algorithm) is never revealed.
 */

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::backend::auth::sessions::{AccessClaims, TokenService};
use crate::backend::error::BackendError;

/// Path prefixes that bypass the gate
pub const PUBLIC_PATH_PREFIXES: &[&str] = &["/register", "/login"];

const BEARER_PREFIX: &str = "Bearer ";

/// Why the gate turned a request away
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateRejection {
    /// No `Authorization` header
    MissingCredential,
    /// `Authorization` is present but not `Bearer <token>`
    MalformedCredential,
    /// The token failed verification
    Unauthenticated,
}

impl GateRejection {
    pub fn reason(&self) -> &'static str {
        match self {
            Self::MissingCredential => "missing credential",
            Self::MalformedCredential => "malformed credential",
            Self::Unauthenticated => "unauthenticated",
        }
    }
}

impl From<GateRejection> for BackendError {
    fn from(rejection: GateRejection) -> Self {
        BackendError::Unauthenticated(rejection.reason().to_string())
    }
}

impl IntoResponse for GateRejection {
    fn into_response(self) -> Response {
        BackendError::from(self).into_response()
    }
}

/// Outcome of running the gate over one request
#[derive(Debug, Clone, PartialEq)]
pub enum GateDecision {
    Public,
    Admitted(AccessClaims),
    Rejected(GateRejection),
}

/// Whether a path bypasses the gate.
///
/// Matching is by prefix, so `/registered` is public too.
pub fn is_public_path(path: &str) -> bool {
    PUBLIC_PATH_PREFIXES
        .iter()
        .any(|prefix| path.starts_with(prefix))
}

/// Decide what to do with a request given its path and `Authorization` header.
pub fn evaluate(
    tokens: &TokenService,
    path: &str,
    authorization: Option<&HeaderValue>,
) -> GateDecision {
    if is_public_path(path) {
        return GateDecision::Public;
    }

    let Some(header) = authorization else {
        return GateDecision::Rejected(GateRejection::MissingCredential);
    };

    let token = match header.to_str().ok().and_then(|h| h.strip_prefix(BEARER_PREFIX)) {
        Some(token) => token,
        None => return GateDecision::Rejected(GateRejection::MalformedCredential),
    };

    match tokens.verify_access(token) {
        Some(claims) => GateDecision::Admitted(claims),
        None => GateDecision::Rejected(GateRejection::Unauthenticated),
    }
}

/// Authentication middleware
///
/// Applied to the gated part of the router with
/// `axum::middleware::from_fn_with_state`. Admitted requests carry their
/// `AccessClaims` in the request extensions, where [`AuthUser`] picks them up.
pub async fn auth_middleware(
    State(tokens): State<TokenService>,
    mut request: Request,
    next: Next,
) -> Result<Response, GateRejection> {
    let decision = evaluate(
        &tokens,
        request.uri().path(),
        request.headers().get(AUTHORIZATION),
    );

    match decision {
        GateDecision::Public => Ok(next.run(request).await),
        GateDecision::Admitted(claims) => {
            request.extensions_mut().insert(claims);
            Ok(next.run(request).await)
        }
        GateDecision::Rejected(rejection) => {
            tracing::warn!(
                "Rejected {} {}: {}",
                request.method(),
                request.uri().path(),
                rejection.reason()
            );
            Err(rejection)
        }
    }
}

/// Axum extractor for the claims attached by [`auth_middleware`]
///
/// Rejects with 401 when used on a route the gate did not run on.
#[derive(Debug, Clone)]
pub struct AuthUser(pub AccessClaims);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = GateRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AccessClaims>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| {
                tracing::warn!("AccessClaims not found in request extensions");
                GateRejection::Unauthenticated
            })
    }
}
