//! Access gate: bearer-token session check in front of note routes.
//!
//! [`require_session`] runs as route middleware. A request without a bearer
//! token is rejected as unauthenticated (401); a token that fails to resolve
//! is rejected as an invalid session (403). On success the resolved
//! [`OwnerId`] is stored in request extensions, where the [`Owner`] extractor
//! picks it up. Nothing is cached between requests.

use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::Response;
use tracing::debug;

use cloudnotes_core::{Error, OwnerId};

use crate::error::ApiError;
use crate::state::AppState;

const MISSING_TOKEN: &str = "Access token required";
const INVALID_TOKEN: &str = "Invalid or expired token";

/// Extract the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Middleware requiring a valid session.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(request.headers())
        .ok_or_else(|| Error::Unauthenticated(MISSING_TOKEN.to_string()))?;

    let user_id = state.sessions.resolve(token).map_err(|e| {
        debug!(
            subsystem = "api",
            component = "gate",
            op = "resolve",
            reason = %e,
            "Session rejected"
        );
        Error::InvalidSession(INVALID_TOKEN.to_string())
    })?;

    request.extensions_mut().insert(OwnerId(user_id));
    Ok(next.run(request).await)
}

/// The owner resolved by [`require_session`].
#[derive(Debug, Clone, Copy)]
pub struct Owner(pub OwnerId);

#[axum::async_trait]
impl<S> FromRequestParts<S> for Owner
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<OwnerId>()
            .copied()
            .map(Owner)
            .ok_or_else(|| ApiError::Unauthorized(MISSING_TOKEN.to_string()))
    }
}
