//! Sign-in, sign-out and the OTP password-reset flow.

use chrono::Utc;
use ecocharge_types::validation::{check, LoginForm, ResetPasswordForm, SendOtpForm, VerifyOtpForm};
use ecocharge_types::{AdminSession, LoginResponse};
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::client::{ack_message, error_message, read_json, retry_after, EcoChargeClient};
use crate::cooldown;
use crate::error::ClientError;

/// Result of checking a password-reset code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OtpVerification {
    /// Whether the API accepted the code
    pub verified: bool,
    /// Token some deployments return for the final reset call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset_token: Option<String>,
    /// Text to show the user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl OtpVerification {
    /// Read a 2xx verify-otp body.
    ///
    /// An explicit `verified` / `success` / `valid` flag decides; a body
    /// without one is accepted on the strength of the status alone.
    fn from_success_body(value: &Value) -> Result<Self, ClientError> {
        let flag = ["verified", "success", "valid"].iter().find_map(|key| value.get(*key));
        let verified = match flag {
            None => true,
            Some(flag) => flag.as_bool().ok_or_else(|| {
                ClientError::InvalidResponse(format!("verification flag is not a boolean: {}", flag))
            })?,
        };
        let reset_token = ["resetToken", "token"]
            .iter()
            .find_map(|key| value.get(*key).and_then(Value::as_str))
            .map(str::to_string);
        let message = ["message", "error"]
            .iter()
            .find_map(|key| value.get(*key).and_then(Value::as_str))
            .map(str::to_string);
        Ok(Self { verified, reset_token, message })
    }
}

impl EcoChargeClient {
    /// Sign in and cache the session.
    ///
    /// Refused locally while a login cooldown is active. A 429 from the API
    /// starts a new cooldown; a 401 maps to [`ClientError::InvalidCredentials`].
    pub async fn login(&self, form: &LoginForm) -> Result<AdminSession, ClientError> {
        check(form)?;
        self.ensure_no_cooldown()?;

        let body = json!({ "username": form.username.trim(), "password": form.password });
        let resp = self.public_raw(Method::POST, "/api/admin/login", Some(&body)).await?;

        match resp.status() {
            StatusCode::TOO_MANY_REQUESTS => {
                let now = Utc::now();
                let until = cooldown::cooldown_until(retry_after(resp.headers()), now);
                self.store().save_cooldown(until)?;
                let remaining_secs = cooldown::remaining_secs(until, now).unwrap_or(0);
                tracing::warn!(remaining_secs, "Login rate-limited, cooldown started");
                Err(ClientError::CooldownActive { remaining_secs })
            },
            StatusCode::UNAUTHORIZED | StatusCode::NOT_FOUND => {
                tracing::debug!(status = %resp.status(), "Login rejected");
                Err(ClientError::InvalidCredentials)
            },
            _ => {
                let response: LoginResponse = read_json(resp).await?;
                let session = AdminSession::from_login(response);
                self.store().save_session(&session)?;
                self.store().clear_cooldown()?;
                tracing::info!(username = %session.admin.username, "Logged in");
                Ok(session)
            },
        }
    }

    /// Seconds left on the login cooldown, clearing it once expired.
    pub fn login_cooldown(&self) -> Result<Option<u64>, ClientError> {
        let Some(until) = self.store().load_cooldown()? else {
            return Ok(None);
        };
        match cooldown::remaining_secs(until, Utc::now()) {
            Some(secs) => Ok(Some(secs)),
            None => {
                self.store().clear_cooldown()?;
                Ok(None)
            },
        }
    }

    fn ensure_no_cooldown(&self) -> Result<(), ClientError> {
        match self.login_cooldown()? {
            Some(remaining_secs) => Err(ClientError::CooldownActive { remaining_secs }),
            None => Ok(()),
        }
    }

    /// Drop the cached session. Purely local.
    pub fn logout(&self) -> Result<(), ClientError> {
        self.store().clear_session()?;
        tracing::info!("Logged out");
        Ok(())
    }

    /// Ask the API to email a reset code.
    pub async fn send_otp(&self, form: &SendOtpForm) -> Result<String, ClientError> {
        check(form)?;
        let body = json!({ "email": form.email.trim() });
        let value: Value =
            self.public(Method::POST, "/api/admin/forgot-password/send-otp", Some(&body)).await?;
        Ok(ack_message(&value, "A verification code has been sent to your email"))
    }

    /// Check a reset code.
    ///
    /// A 400 from the API (wrong or expired code) is reported as
    /// `verified: false` rather than an error.
    pub async fn verify_otp(&self, form: &VerifyOtpForm) -> Result<OtpVerification, ClientError> {
        check(form)?;
        let body = json!({ "email": form.email.trim(), "otp": form.otp });
        let resp =
            self.public_raw(Method::POST, "/api/admin/forgot-password/verify-otp", Some(&body)).await?;

        if resp.status() == StatusCode::BAD_REQUEST {
            let status = resp.status();
            let text = resp.text().await?;
            return Ok(OtpVerification {
                verified: false,
                reset_token: None,
                message: Some(error_message(status, &text)),
            });
        }

        let value: Value = read_json(resp).await?;
        OtpVerification::from_success_body(&value)
    }

    /// Set a new password using a verified code. The cached session is untouched.
    pub async fn reset_password(&self, form: &ResetPasswordForm) -> Result<String, ClientError> {
        check(form)?;
        let body = json!({
            "email": form.email.trim(),
            "otp": form.otp,
            "newPassword": form.new_password,
        });
        let value: Value =
            self.public(Method::POST, "/api/admin/forgot-password/reset", Some(&body)).await?;
        Ok(ack_message(&value, "Password has been reset"))
    }
}
