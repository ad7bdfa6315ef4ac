//! Client-side form validation.
//!
//! Every form sent to the API derives [`validator::Validate`]. Use [`check`]
//! to turn the result into a single [`FormError`] for display.

mod forms;
pub mod rules;

pub use forms::{
    ChangePasswordForm, ChangeUsernameForm, LoginForm, ProfileUpdate, RatingForm, ReportForm,
    ResetPasswordForm, SendOtpForm, SqlQuery, VerifyOtpForm,
};

use validator::Validate;

use crate::error::FormError;

/// Validate a form, reporting the first problem found.
pub fn check<F: Validate>(form: &F) -> Result<(), FormError> {
    form.validate().map_err(|errors| FormError::from_validation(&errors))
}
