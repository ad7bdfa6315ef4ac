//! Error types for the EcoCharge client.

use ecocharge_types::{FormError, ListError};
use thiserror::Error;

/// Errors that can occur when using the EcoCharge client.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Failed to reach the API.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// HTTP request failed.
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server returned an invalid or unparseable response.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// A form failed client-side validation; nothing was sent.
    #[error("{0}")]
    Validation(#[from] FormError),

    /// Login rejected the username/password pair.
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// An admin-only call was made without a cached session.
    #[error("Not logged in")]
    NotAuthenticated,

    /// The API kept rejecting the token; the session has been cleared.
    #[error("Session expired, please log in again")]
    SessionExpired,

    /// Login is blocked locally after the API rate-limited it.
    #[error("Too many login attempts, try again in {remaining_secs}s")]
    CooldownActive {
        /// Seconds until login may be attempted again.
        remaining_secs: u64,
    },

    /// Server returned 429 Too Many Requests.
    #[error("Rate limited (429): retry after {retry_after:?}s")]
    RateLimited {
        /// Seconds to wait before retrying, if provided by server.
        retry_after: Option<u64>,
    },

    /// Server returned a non-success status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from server.
        message: String,
    },

    /// Reading or writing the local session file failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration is missing or malformed.
    #[error("Config error: {0}")]
    Config(String),

    /// Error occurred on the change feed.
    #[error("Stream error: {0}")]
    Stream(String),

    /// A change-feed event could not be parsed.
    #[error("Bad change event: {0}")]
    BadEvent(String),

    /// A change event could not be applied.
    #[error(transparent)]
    List(#[from] ListError),
}

impl ClientError {
    /// Short text suitable for a toast or a CLI error line.
    pub fn user_message(&self) -> String {
        match self {
            Self::Connection(_) | Self::Request(_) => {
                "Cannot reach the EcoCharge server. Check your connection.".to_string()
            },
            Self::Api { message, .. } => message.clone(),
            Self::RateLimited { retry_after: Some(secs) } => {
                format!("Too many requests, try again in {}s", secs)
            },
            Self::RateLimited { retry_after: None } => {
                "Too many requests, try again later".to_string()
            },
            other => other.to_string(),
        }
    }

    /// Whether the caller should send the user back to the login screen.
    pub const fn requires_login(&self) -> bool {
        matches!(self, Self::NotAuthenticated | Self::SessionExpired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_uses_server_text() {
        let err = ClientError::Api { status: 400, message: "Email already in use".to_string() };
        assert_eq!(err.user_message(), "Email already in use");
    }

    #[test]
    fn test_requires_login() {
        assert!(ClientError::SessionExpired.requires_login());
        assert!(!ClientError::InvalidCredentials.requires_login());
    }

    #[test]
    fn test_cooldown_message() {
        let msg = ClientError::CooldownActive { remaining_secs: 42 }.user_message();
        assert!(msg.contains("42s"));
    }
}
