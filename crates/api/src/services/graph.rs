//! Microsoft Graph user directory.
//!
//! Resolves a delegated access token with `GET {base}/me`. Graph validates the
//! token; any rejection is reported as an unknown user.

use std::time::Duration;

use async_trait::async_trait;
use domain::models::UserDetails;
use domain::services::UserDirectory;
use domain::DirectoryError;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

use crate::config::DirectoryConfig;

/// Subset of the Graph `user` resource returned by `/me`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphUser {
    id: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    mail: Option<String>,
    #[serde(default)]
    user_principal_name: Option<String>,
}

impl GraphUser {
    fn into_user_details(self) -> UserDetails {
        let user_principal_name = self.user_principal_name.unwrap_or_default();
        UserDetails {
            display_name: self
                .display_name
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| user_principal_name.clone()),
            email: self.mail.filter(|m| !m.is_empty()),
            user_principal_name,
            id: self.id,
        }
    }
}

/// Map a non-success Graph status to a directory error.
fn status_error(status: StatusCode) -> DirectoryError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => {
            DirectoryError::AuthUserNotFound
        }
        other => DirectoryError::UserServiceFailure(format!("Graph returned HTTP {}", other)),
    }
}

/// User directory backed by Microsoft Graph.
#[derive(Debug, Clone)]
pub struct GraphUserDirectory {
    client: Client,
    me_url: String,
    timeout_ms: u64,
}

impl GraphUserDirectory {
    pub fn new(config: &DirectoryConfig) -> Result<Self, DirectoryError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| DirectoryError::UserServiceFailure(e.to_string()))?;

        Ok(Self {
            client,
            me_url: format!("{}/me", config.graph_base_url.trim_end_matches('/')),
            timeout_ms: config.timeout_ms,
        })
    }

    pub fn me_url(&self) -> &str {
        &self.me_url
    }
}

#[async_trait]
impl UserDirectory for GraphUserDirectory {
    async fn lookup(&self, access_token: &str) -> Result<UserDetails, DirectoryError> {
        if access_token.trim().is_empty() {
            return Err(DirectoryError::AuthUserNotFound);
        }

        debug!(url = %self.me_url, "Calling Graph /me");

        let response = self
            .client
            .get(&self.me_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    DirectoryError::UserServiceFailure(format!(
                        "Graph request timed out after {}ms",
                        self.timeout_ms
                    ))
                } else {
                    DirectoryError::UserServiceFailure(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status));
        }

        let user: GraphUser = response
            .json()
            .await
            .map_err(|e| DirectoryError::UserServiceFailure(format!("Invalid Graph response: {}", e)))?;

        Ok(user.into_user_details())
    }
}
