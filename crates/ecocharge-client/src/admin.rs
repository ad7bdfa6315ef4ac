//! Operations behind the admin session: profile, credentials, SQL console, reports.

use ecocharge_types::validation::{
    check, ChangePasswordForm, ChangeUsernameForm, ProfileUpdate, SqlQuery,
};
use ecocharge_types::{AdminProfile, AdminSession, Report, SqlResult};
use reqwest::Method;
use serde_json::{json, Value};

use crate::client::{ack_message, unwrap_list, unwrap_object, EcoChargeClient};
use crate::error::ClientError;
use crate::session::StoredState;

impl EcoChargeClient {
    /// Fetch the signed-in admin's profile and refresh the cached copy.
    pub async fn profile(&self) -> Result<AdminProfile, ClientError> {
        let value: Value = self.authorized(Method::GET, "/api/admin/profile", None).await?;
        let profile: AdminProfile = unwrap_object(&value, "admin")
            .ok_or_else(|| ClientError::InvalidResponse("profile missing from response".into()))?;
        self.update_cached_admin(|admin| *admin = profile.clone())?;
        Ok(profile)
    }

    /// Update profile fields. Returns the profile as now cached.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<AdminProfile, ClientError> {
        check(update)?;
        let body = serde_json::to_value(update)
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;
        let value: Value = self.authorized(Method::PUT, "/api/admin/profile", Some(&body)).await?;

        let returned: Option<AdminProfile> = unwrap_object(&value, "admin");
        let session = self.update_cached_admin(|admin| match &returned {
            Some(profile) => *admin = profile.clone(),
            None => apply_update(admin, update),
        })?;
        session.map(|s| s.admin).ok_or(ClientError::SessionExpired)
    }

    /// Rename the signed-in admin.
    pub async fn change_username(&self, form: &ChangeUsernameForm) -> Result<String, ClientError> {
        check(form)?;
        let body = json!({
            "newUsername": form.new_username,
            "currentPassword": form.current_password,
        });
        let value: Value =
            self.authorized(Method::PUT, "/api/admin/change-username", Some(&body)).await?;
        self.update_cached_admin(|admin| admin.username = form.new_username.clone())?;
        Ok(ack_message(&value, "Username updated"))
    }

    /// Change the signed-in admin's password. The session stays valid.
    pub async fn change_password(&self, form: &ChangePasswordForm) -> Result<String, ClientError> {
        check(form)?;
        let body = json!({
            "currentPassword": form.current_password,
            "newPassword": form.new_password,
        });
        let value: Value =
            self.authorized(Method::PUT, "/api/admin/change-password", Some(&body)).await?;
        Ok(ack_message(&value, "Password updated"))
    }

    /// Run a statement on the diagnostic SQL console.
    pub async fn execute_sql(&self, query: &SqlQuery) -> Result<SqlResult, ClientError> {
        check(query)?;
        let body = json!({ "query": query.query.trim() });
        let value: Value = self.authorized(Method::POST, "/api/admin/sql", Some(&body)).await?;
        Ok(SqlResult::from_value(value))
    }

    /// All problem reports, for triage.
    pub async fn list_reports(&self) -> Result<Vec<Report>, ClientError> {
        let value: Value = self.authorized(Method::GET, "/api/reports", None).await?;
        unwrap_list(value, "reports")
    }

    fn update_cached_admin<F>(&self, mut edit: F) -> Result<Option<AdminSession>, ClientError>
    where
        F: FnMut(&mut AdminProfile),
    {
        let state = self.store().modify(&mut |state: &mut StoredState| {
            if let Some(session) = state.session.as_mut() {
                edit(&mut session.admin);
            }
        })?;
        Ok(state.session)
    }
}

fn apply_update(admin: &mut AdminProfile, update: &ProfileUpdate) {
    if let Some(name) = &update.full_name {
        admin.full_name = Some(name.clone());
    }
    if let Some(email) = &update.email {
        admin.email = email.clone();
    }
    if let Some(phone) = &update.phone {
        admin.phone = Some(phone.clone());
    }
}
