//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::{debug, error};
use wellbeing_core::domain::TokenKind;
use wellbeing_core::ports::PortError;

use crate::web::state::{AppState, AuthUser};

/// Name of the cookie carrying the access token for browser clients.
pub const SESSION_COOKIE: &str = "session";

/// Finds the access token on a request: `Authorization: Bearer` first, then
/// the session cookie.
pub fn access_token(headers: &HeaderMap) -> Option<&str> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());

    bearer.or_else(|| {
        headers
            .get(header::COOKIE)
            .and_then(|v| v.to_str().ok())?
            .split(';')
            .find_map(|c| {
                c.trim()
                    .strip_prefix(SESSION_COOKIE)
                    .and_then(|rest| rest.strip_prefix('='))
            })
            .filter(|t| !t.is_empty())
    })
}

/// Middleware that validates the access token and extracts the user_id.
///
/// If valid, inserts an `AuthUser` into request extensions for handlers to use.
/// If invalid or missing, returns 401 Unauthorized.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = access_token(req.headers()).ok_or(StatusCode::UNAUTHORIZED)?;

    let user_id = state
        .db
        .validate_auth_token(token, TokenKind::Access)
        .await
        .map_err(|e| match e {
            PortError::Unauthorized => {
                debug!("Rejected an unknown or expired access token.");
                StatusCode::UNAUTHORIZED
            }
            other => {
                error!("Failed to validate access token: {:?}", other);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        })?;

    req.extensions_mut().insert(AuthUser(user_id));
    Ok(next.run(req).await)
}
