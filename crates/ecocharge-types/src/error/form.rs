//! Form validation errors.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use thiserror::Error;
use validator::{ValidationErrors, ValidationErrorsKind};

/// Name used for errors raised by struct-level checks (e.g. password confirmation).
const FORM_LEVEL_FIELD: &str = "__all__";

/// A form failed client-side validation.
///
/// Carries the first failing field and a message suitable for display.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[error("{message}")]
pub struct FormError {
    /// Name of the offending field, or `form` for cross-field checks
    pub field: String,
    /// Human-readable description of the problem
    pub message: String,
}

impl FormError {
    /// Create an error for a single field.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field: field.into(), message: message.into() }
    }

    /// Collapse `validator` output into the first reportable problem.
    ///
    /// Field errors win over struct-level errors; among fields the
    /// alphabetically first one is reported so output is stable.
    pub fn from_validation(errors: &ValidationErrors) -> Self {
        let mut entries: Vec<(String, &ValidationErrorsKind)> =
            errors.errors().iter().map(|(field, kind)| (field.to_string(), kind)).collect();
        entries.sort_by(|(a, _), (b, _)| {
            (a == FORM_LEVEL_FIELD).cmp(&(b == FORM_LEVEL_FIELD)).then_with(|| a.cmp(b))
        });

        for (field, kind) in entries {
            let field = if field == FORM_LEVEL_FIELD { "form".to_string() } else { field };
            match kind {
                ValidationErrorsKind::Field(list) => {
                    if let Some(first) = list.first() {
                        let message = first
                            .message
                            .as_ref()
                            .map_or_else(|| default_message(&field, &first.code), Cow::to_string);
                        return Self { field, message };
                    }
                },
                ValidationErrorsKind::Struct(inner) => return Self::from_validation(inner),
                ValidationErrorsKind::List(items) => {
                    if let Some(inner) = items.values().next() {
                        return Self::from_validation(inner);
                    }
                },
            }
        }

        Self::new("form", "Invalid input")
    }
}

fn default_message(field: &str, code: &str) -> String {
    match code {
        "length" => format!("{} has an invalid length", field),
        "range" => format!("{} is out of range", field),
        "required" => format!("{} is required", field),
        _ => format!("{} is invalid", field),
    }
}
