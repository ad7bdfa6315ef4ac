//! Charging device locations.

use serde::{Deserialize, Serialize};

use super::ids::string_or_number;

/// A charging device and where it is.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    /// Server-side identifier
    #[serde(alias = "_id", deserialize_with = "string_or_number")]
    pub id: String,
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// WGS84 latitude
    #[serde(alias = "lat")]
    pub latitude: f64,
    /// WGS84 longitude
    #[serde(alias = "lng", alias = "lon")]
    pub longitude: f64,
    /// Availability as reported by the device (e.g. "available", "charging")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Last position update as reported by the API
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}
