//! Bearer-token user authentication middleware.
//!
//! Tokens are opaque to this service: they are handed to the configured user
//! directory, which answers with the caller's details or rejects the token.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::app::AppState;
use crate::error::ApiError;

/// Extract the token from an `Authorization: Bearer <token>` header.
///
/// The scheme is matched case-insensitively; an empty token counts as missing.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();

    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}

/// Middleware that requires a directory-verified user.
///
/// The resolved `UserDetails` is stored in request extensions for the
/// `CurrentUser` extractor.
pub async fn require_user(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let token = match bearer_token(req.headers()) {
        Some(token) => token.to_string(),
        None => {
            return ApiError::Unauthorized("Missing or invalid Authorization header".into())
                .into_response();
        }
    };

    match state.directory.lookup(&token).await {
        Ok(user) => {
            tracing::debug!(user = %user.identity(), "Authenticated request");
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}
