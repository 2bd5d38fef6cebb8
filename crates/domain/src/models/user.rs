//! Directory user details.

use serde::{Deserialize, Serialize};

/// Canonical identity of an authenticated caller, as resolved by the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDetails {
    /// Directory object id.
    pub id: String,
    pub display_name: String,
    pub email: Option<String>,
    pub user_principal_name: String,
}

impl UserDetails {
    /// Identity recorded against generated reports: the mail address when the
    /// directory has one, otherwise the user principal name.
    pub fn identity(&self) -> &str {
        self.email
            .as_deref()
            .filter(|e| !e.is_empty())
            .unwrap_or(&self.user_principal_name)
    }
}
