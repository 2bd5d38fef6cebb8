//! Authenticated caller extractor.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use domain::models::UserDetails;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::bearer_token;

/// The caller, as resolved by the user directory.
///
/// Uses the details stored by the `require_user` middleware when present and
/// performs the directory lookup itself otherwise.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub UserDetails);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<UserDetails>() {
            return Ok(CurrentUser(user.clone()));
        }

        let token = bearer_token(&parts.headers).ok_or_else(|| {
            ApiError::Unauthorized("Missing or invalid Authorization header".to_string())
        })?;

        let user = state.directory.lookup(token).await?;
        parts.extensions.insert(user.clone());
        Ok(CurrentUser(user))
    }
}
