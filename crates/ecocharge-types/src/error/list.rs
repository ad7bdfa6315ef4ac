//! Live-list errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while applying a change event to a local list.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "details")]
pub enum ListError {
    /// The event payload could not be decoded into the list's record type
    #[error("Cannot decode record {id}: {message}")]
    Decode {
        /// Id carried by the offending event
        id: String,
        /// Decoder error text
        message: String,
    },

    /// An add/modify event arrived without a payload
    #[error("Change event for {id} has no data")]
    MissingData {
        /// Id carried by the offending event
        id: String,
    },
}
