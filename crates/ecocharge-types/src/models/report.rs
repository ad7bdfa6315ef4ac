//! Problem reports filed against charging stations.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::string_or_number;

/// Triage state of a report. Unknown values from the API are preserved.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ReportStatus {
    /// Filed, not yet looked at
    #[default]
    Pending,
    /// Someone is working on it
    InProgress,
    /// Closed
    Resolved,
    /// Any other status string
    Other(String),
}

impl From<String> for ReportStatus {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "pending" | "open" | "new" => Self::Pending,
            "in_progress" | "inprogress" => Self::InProgress,
            "resolved" | "closed" | "done" => Self::Resolved,
            _ => Self::Other(value),
        }
    }
}

impl From<ReportStatus> for String {
    fn from(status: ReportStatus) -> Self {
        status.to_string()
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => f.write_str("pending"),
            Self::InProgress => f.write_str("in_progress"),
            Self::Resolved => f.write_str("resolved"),
            Self::Other(s) => f.write_str(s),
        }
    }
}

/// A problem report as listed for admins.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Server-side identifier
    #[serde(alias = "_id", deserialize_with = "string_or_number")]
    pub id: String,
    /// Who filed the report
    #[serde(alias = "name")]
    pub reporter_name: String,
    /// Reporter email
    #[serde(default, alias = "email", skip_serializing_if = "Option::is_none")]
    pub reporter_email: Option<String>,
    /// Problem category (e.g. "charger", "parking", "payment")
    #[serde(alias = "issueType")]
    pub category: String,
    /// What went wrong
    pub description: String,
    /// Station or place the problem was seen
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Triage state
    #[serde(default)]
    pub status: ReportStatus,
    /// Filing timestamp as reported by the API
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}
