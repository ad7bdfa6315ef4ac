//! Contact form messages.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::validation::rules;

/// Message sent through the public contact form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct ContactMessage {
    /// Sender name
    #[validate(length(min = 1, max = 100, message = "Name is required (max 100 characters)"))]
    pub name: String,
    /// Reply-to address
    #[validate(custom(function = "rules::email"))]
    pub email: String,
    /// Optional subject line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 200, message = "Subject must be at most 200 characters"))]
    pub subject: Option<String>,
    /// Message body
    #[validate(length(min = 1, max = 2000, message = "Message must be 1 to 2000 characters"))]
    pub message: String,
}
