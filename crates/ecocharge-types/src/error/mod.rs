//! Typed error definitions for the EcoCharge client types.
//!
//! All errors are serializable so a front end can forward them verbatim,
//! and displayable so they can be shown as a one-line toast.

mod form;
mod list;

pub use form::FormError;
pub use list::ListError;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let err = FormError::new("email", "Enter a valid email address");

        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("email"));

        let deserialized: FormError = serde_json::from_str(&json).unwrap();
        assert_eq!(err, deserialized);
    }

    #[test]
    fn test_error_display() {
        let err = ListError::Decode { id: "r-9".to_string(), message: "missing field".to_string() };

        let msg = format!("{}", err);
        assert!(msg.contains("r-9"));
        assert!(msg.contains("missing field"));
    }
}
