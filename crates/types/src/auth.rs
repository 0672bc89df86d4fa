//! Authentication records exchanged with the storefront API.

use serde::{Deserialize, Serialize};

/// Account returned by the storefront after login.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StorefrontUser {
    #[serde(alias = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// Access token paired with the account it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub access_token: String,
    pub user: StorefrontUser,
}

/// Authentication state held by the client.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AuthState {
    pub user: Option<StorefrontUser>,
    pub token: Option<String>,
    pub is_authenticated: bool,
}

impl AuthState {
    pub fn from_credentials(credentials: Credentials) -> Self {
        Self {
            user: Some(credentials.user),
            token: Some(credentials.access_token),
            is_authenticated: true,
        }
    }
}
