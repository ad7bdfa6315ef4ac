//! Individual field rules.
//!
//! The `is_*` predicates are plain checks; the functions without the prefix
//! wrap them for `#[validate(custom(function = ...))]`.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use validator::ValidationError;

/// Minimum password length accepted by the API.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Number of digits in a password-reset code.
pub const OTP_LEN: usize = 6;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Email regex is valid")
});

/// Shortest and longest accepted phone number, `+` included.
const PHONE_LEN: std::ops::RangeInclusive<usize> = 7..=20;

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9][0-9 \-]*$").expect("Phone regex is valid"));

/// `local@domain.tld`; a domain without a dot is rejected.
pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value.trim())
}

/// At least [`MIN_PASSWORD_LEN`] characters with one letter and one digit.
pub fn is_strong_password(value: &str) -> bool {
    value.chars().count() >= MIN_PASSWORD_LEN
        && value.chars().any(|c| c.is_ascii_alphabetic())
        && value.chars().any(|c| c.is_ascii_digit())
}

/// 3 to 30 characters from `[A-Za-z0-9_.-]`.
pub fn is_valid_username(value: &str) -> bool {
    (3..=30).contains(&value.len())
        && value.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
}

/// Exactly [`OTP_LEN`] ASCII digits.
pub fn is_valid_otp(value: &str) -> bool {
    value.len() == OTP_LEN && value.chars().all(|c| c.is_ascii_digit())
}

/// 7 to 20 characters of digits, spaces, dashes and an optional leading `+`.
pub fn is_valid_phone(value: &str) -> bool {
    let value = value.trim();
    PHONE_LEN.contains(&value.len()) && PHONE_RE.is_match(value)
}

fn fail(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

pub fn email(value: &str) -> Result<(), ValidationError> {
    if is_valid_email(value) {
        Ok(())
    } else {
        Err(fail("email", "Enter a valid email address"))
    }
}

pub fn password(value: &str) -> Result<(), ValidationError> {
    if is_strong_password(value) {
        Ok(())
    } else {
        Err(fail(
            "password",
            "Password must be at least 8 characters and contain a letter and a digit",
        ))
    }
}

pub fn username(value: &str) -> Result<(), ValidationError> {
    if is_valid_username(value) {
        Ok(())
    } else {
        Err(fail(
            "username",
            "Username must be 3-30 characters of letters, digits, '.', '_' or '-'",
        ))
    }
}

pub fn otp(value: &str) -> Result<(), ValidationError> {
    if is_valid_otp(value) {
        Ok(())
    } else {
        Err(fail("otp", "Enter the 6-digit code sent to your email"))
    }
}

pub fn phone(value: &str) -> Result<(), ValidationError> {
    if is_valid_phone(value) {
        Ok(())
    } else {
        Err(fail("phone", "Enter a valid phone number"))
    }
}

pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(fail("required", "This field is required"))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_requires_dotted_domain() {
        assert!(!is_valid_email("foo@bar"));
        assert!(!is_valid_email("foo bar@uni.edu"));
        assert!(!is_valid_email("@uni.edu"));
        assert!(is_valid_email("a.b@uni.edu"));
        assert!(is_valid_email("  admin@ecocharge.io "));
    }

    #[test]
    fn test_password_strength() {
        assert!(!is_strong_password("abcde1g"));
        assert!(!is_strong_password("abcdefgh"));
        assert!(!is_strong_password("12345678"));
        assert!(is_strong_password("abcdefg1"));
    }

    #[test]
    fn test_otp() {
        assert!(is_valid_otp("012345"));
        assert!(!is_valid_otp("12345"));
        assert!(!is_valid_otp("12345a"));
        assert!(!is_valid_otp("1234567"));
    }

    #[test]
    fn test_username() {
        assert!(is_valid_username("ops.admin"));
        assert!(!is_valid_username("ab"));
        assert!(!is_valid_username("has space"));
    }

    #[test]
    fn test_phone() {
        assert!(is_valid_phone("+60 12-345 6789"));
        assert!(!is_valid_phone("12ab"));
    }

    #[test]
    fn test_phone_length_bounds() {
        assert!(!is_valid_phone("123456"));
        assert!(is_valid_phone("1234567"));
        assert!(is_valid_phone("12345678901234567890"));
        assert!(!is_valid_phone("123456789012345678901"));
        assert!(is_valid_phone("+123456"));
        assert!(!is_valid_phone("+12345"));
    }
}
