//! End-user operations: contact form, ratings, problem reports, device map.

use ecocharge_types::validation::{check, RatingForm, ReportForm};
use ecocharge_types::{ContactMessage, Device, Rating, RatingSummary, Report};
use reqwest::Method;
use serde_json::Value;

use crate::client::{
    ack_message, created_id, path_with_segment, unwrap_list, unwrap_object, EcoChargeClient,
};
use crate::error::ClientError;

fn to_body<T: serde::Serialize>(form: &T) -> Result<Value, ClientError> {
    serde_json::to_value(form).map_err(|e| ClientError::InvalidResponse(e.to_string()))
}

impl EcoChargeClient {
    /// Submit the contact form.
    pub async fn send_contact(&self, message: &ContactMessage) -> Result<String, ClientError> {
        check(message)?;
        let value: Value =
            self.public(Method::POST, "/api/contact", Some(&to_body(message)?)).await?;
        Ok(ack_message(&value, "Thanks, your message has been sent"))
    }

    /// Submit a new rating and return it as stored.
    ///
    /// When the API answers with only an id, the record is rebuilt from the form.
    pub async fn submit_rating(&self, form: &RatingForm) -> Result<Rating, ClientError> {
        check(form)?;
        let value: Value = self.public(Method::POST, "/api/ratings", Some(&to_body(form)?)).await?;
        record_from_response(&value, "rating", |id| form.clone().into_rating(id))
    }

    /// Replace an existing rating.
    pub async fn edit_rating(&self, id: &str, form: &RatingForm) -> Result<Rating, ClientError> {
        check(form)?;
        let path = path_with_segment("/api/ratings", id)?;
        let value: Value = self.public(Method::PUT, &path, Some(&to_body(form)?)).await?;
        let rating = unwrap_object(&value, "rating")
            .unwrap_or_else(|| form.clone().into_rating(id.to_string()));
        Ok(rating)
    }

    pub async fn list_ratings(&self) -> Result<Vec<Rating>, ClientError> {
        let value: Value = self.public(Method::GET, "/api/ratings", None).await?;
        unwrap_list(value, "ratings")
    }

    /// Count, mean and star histogram over all ratings.
    pub async fn rating_summary(&self) -> Result<RatingSummary, ClientError> {
        let ratings = self.list_ratings().await?;
        Ok(RatingSummary::from_ratings(&ratings))
    }

    /// File a problem report.
    pub async fn submit_report(&self, form: &ReportForm) -> Result<Report, ClientError> {
        check(form)?;
        let value: Value = self.public(Method::POST, "/api/reports", Some(&to_body(form)?)).await?;
        record_from_response(&value, "report", |id| form.clone().into_report(id))
    }

    /// Charging devices with their positions.
    pub async fn list_devices(&self) -> Result<Vec<Device>, ClientError> {
        let value: Value = self.public(Method::GET, "/api/devices", None).await?;
        unwrap_list(value, "devices")
    }
}

fn record_from_response<T, F>(value: &Value, key: &str, from_form: F) -> Result<T, ClientError>
where
    T: serde::de::DeserializeOwned,
    F: FnOnce(String) -> T,
{
    if let Some(record) = unwrap_object(value, key) {
        return Ok(record);
    }
    created_id(value)
        .map(from_form)
        .ok_or_else(|| ClientError::InvalidResponse(format!("created {} has no id", key)))
}
