//! Identity directory contract.
//!
//! Callers authenticate with a bearer token issued by the organisation's
//! identity provider; the directory turns that token into a `UserDetails`.

use crate::error::DirectoryError;
use crate::models::UserDetails;

/// Resolves an access token into the user it was issued to.
#[async_trait::async_trait]
pub trait UserDirectory: Send + Sync {
    async fn lookup(&self, access_token: &str) -> Result<UserDetails, DirectoryError>;
}

/// Directory that answers every lookup with the same user.
///
/// Used for local profiles, where no identity provider is reachable.
#[derive(Debug, Clone)]
pub struct StubUserDirectory {
    user: UserDetails,
}

impl StubUserDirectory {
    pub fn new(user: UserDetails) -> Self {
        Self { user }
    }
}

#[async_trait::async_trait]
impl UserDirectory for StubUserDirectory {
    async fn lookup(&self, access_token: &str) -> Result<UserDetails, DirectoryError> {
        if access_token.trim().is_empty() {
            return Err(DirectoryError::AuthUserNotFound);
        }
        tracing::debug!(user = %self.user.identity(), "Resolved user from stub directory");
        Ok(self.user.clone())
    }
}
