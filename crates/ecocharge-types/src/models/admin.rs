//! Admin account and session types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::string_or_number;

/// Profile of an authenticated administrator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AdminProfile {
    /// Server-side identifier
    #[serde(alias = "_id", deserialize_with = "string_or_number")]
    pub id: String,
    /// Login name
    pub username: String,
    /// Contact email, also used for password reset
    pub email: String,
    /// Display name
    #[serde(default, alias = "fullname", skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    /// Phone number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Role assigned by the API (e.g. "admin", "superadmin")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl AdminProfile {
    /// Name to greet the admin with.
    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().filter(|n| !n.trim().is_empty()).unwrap_or(&self.username)
    }
}

/// Body returned by a successful login.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    /// Bearer token for subsequent calls
    #[serde(alias = "accessToken")]
    pub token: String,
    /// Profile of the admin who logged in
    #[serde(alias = "user")]
    pub admin: AdminProfile,
}

/// Bearer token plus profile cached after a successful login.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdminSession {
    /// Bearer token attached to authorized calls
    pub token: String,
    /// Cached profile, refreshed after profile/username updates
    pub admin: AdminProfile,
    /// When the session was established
    pub logged_in_at: DateTime<Utc>,
}

impl AdminSession {
    /// Build a session from a login response, stamped with the current time.
    pub fn from_login(response: LoginResponse) -> Self {
        Self { token: response.token, admin: response.admin, logged_in_at: Utc::now() }
    }

    /// Authorization header value.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}
