//! Forms submitted to the API.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use validator::{Validate, ValidationError};

use super::rules;
use crate::models::{Rating, Report, ReportStatus};

/// Longest statement accepted by the SQL console.
pub const MAX_SQL_LEN: usize = 10_000;

/// Admin sign-in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct LoginForm {
    #[validate(custom(function = "rules::not_blank", message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// First step of password reset: ask the API to email a code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct SendOtpForm {
    #[validate(custom(function = "rules::email"))]
    pub email: String,
}

/// Second step of password reset: check the emailed code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct VerifyOtpForm {
    #[validate(custom(function = "rules::email"))]
    pub email: String,
    #[validate(custom(function = "rules::otp"))]
    pub otp: String,
}

/// Final step of password reset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "reset_confirmation_matches"))]
pub struct ResetPasswordForm {
    #[validate(custom(function = "rules::email"))]
    pub email: String,
    #[validate(custom(function = "rules::otp"))]
    pub otp: String,
    #[validate(custom(function = "rules::password"))]
    pub new_password: String,
    #[serde(default, skip_serializing)]
    pub confirm_password: String,
}

fn reset_confirmation_matches(form: &ResetPasswordForm) -> Result<(), ValidationError> {
    confirmation_matches(&form.new_password, &form.confirm_password)
}

/// Editable admin profile fields. `None` leaves a field unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "profile_update_not_empty"))]
pub struct ProfileUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 100, message = "Full name must be 1 to 100 characters"))]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "rules::email"))]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "rules::phone"))]
    pub phone: Option<String>,
}

impl ProfileUpdate {
    /// Whether the update would change nothing.
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none() && self.email.is_none() && self.phone.is_none()
    }
}

fn profile_update_not_empty(form: &ProfileUpdate) -> Result<(), ValidationError> {
    if form.is_empty() {
        Err(ValidationError::new("empty").with_message(Cow::Borrowed("Nothing to update")))
    } else {
        Ok(())
    }
}

/// Rename the signed-in admin; the API re-checks the current password.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangeUsernameForm {
    #[validate(custom(function = "rules::username"))]
    pub new_username: String,
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,
}

/// Change the signed-in admin's password.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "change_password_is_consistent"))]
pub struct ChangePasswordForm {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,
    #[validate(custom(function = "rules::password"))]
    pub new_password: String,
    #[serde(default, skip_serializing)]
    pub confirm_password: String,
}

fn change_password_is_consistent(form: &ChangePasswordForm) -> Result<(), ValidationError> {
    if form.new_password == form.current_password {
        return Err(ValidationError::new("unchanged").with_message(Cow::Borrowed(
            "New password must differ from the current password",
        )));
    }
    confirmation_matches(&form.new_password, &form.confirm_password)
}

fn confirmation_matches(new: &str, confirm: &str) -> Result<(), ValidationError> {
    if new == confirm {
        Ok(())
    } else {
        Err(ValidationError::new("mismatch").with_message(Cow::Borrowed("Passwords do not match")))
    }
}

/// New or edited station rating.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RatingForm {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub station_id: Option<String>,
    #[validate(length(min = 1, max = 100, message = "Name is required (max 100 characters)"))]
    pub user_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "rules::email"))]
    pub user_email: Option<String>,
    #[validate(range(min = 1, max = 5, message = "Choose between 1 and 5 stars"))]
    pub stars: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 500, message = "Comment must be at most 500 characters"))]
    pub comment: Option<String>,
}

impl RatingForm {
    /// Local copy of the rating once the API has assigned an id.
    pub fn into_rating(self, id: impl Into<String>) -> Rating {
        Rating {
            id: id.into(),
            station_id: self.station_id,
            user_name: self.user_name,
            user_email: self.user_email,
            stars: self.stars,
            comment: self.comment,
            created_at: None,
            updated_at: None,
        }
    }
}

/// Problem report filed by a station user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReportForm {
    #[validate(length(min = 1, max = 100, message = "Name is required (max 100 characters)"))]
    pub reporter_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "rules::email"))]
    pub reporter_email: Option<String>,
    #[validate(custom(function = "rules::not_blank", message = "Choose a problem category"))]
    pub category: String,
    #[validate(length(
        min = 10,
        max = 2000,
        message = "Describe the problem in 10 to 2000 characters"
    ))]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl ReportForm {
    /// Local copy of the report once the API has assigned an id.
    pub fn into_report(self, id: impl Into<String>) -> Report {
        Report {
            id: id.into(),
            reporter_name: self.reporter_name,
            reporter_email: self.reporter_email,
            category: self.category,
            description: self.description,
            location: self.location,
            status: ReportStatus::Pending,
            created_at: None,
        }
    }
}

/// Statement for the admin SQL console.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct SqlQuery {
    #[validate(
        custom(function = "rules::not_blank", message = "Enter a SQL statement"),
        length(max = 10000, message = "Statement is too long")
    )]
    pub query: String,
}

impl SqlQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self { query: query.into() }
    }
}
