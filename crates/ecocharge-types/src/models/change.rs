//! Real-time change notifications.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use super::ids::string_or_number;
use crate::error::ListError;

/// Collections pushed over the change feed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    /// Station ratings
    Ratings,
    /// Charging device locations
    Devices,
    /// Anything else the feed may carry
    #[serde(other)]
    Other,
}

impl Collection {
    /// Path segment used by the feed endpoint.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ratings => "ratings",
            Self::Devices => "devices",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happened to a record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// Record created
    #[serde(alias = "add", alias = "insert", alias = "create")]
    Added,
    /// Record changed
    #[serde(alias = "modify", alias = "update", alias = "updated")]
    Modified,
    /// Record deleted
    #[serde(alias = "remove", alias = "delete", alias = "deleted")]
    Removed,
}

/// One notification from the change feed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChangeEvent {
    /// Collection the record belongs to
    pub collection: Collection,
    /// Kind of change
    #[serde(rename = "type", alias = "kind")]
    pub kind: ChangeKind,
    /// Id of the affected record
    #[serde(alias = "_id", deserialize_with = "string_or_number")]
    pub id: String,
    /// Full record after the change; absent for removals
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ChangeEvent {
    /// Decode the payload into a record.
    ///
    /// The event id is injected when the payload omits it, since some
    /// feeds send the id only in the envelope.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, ListError> {
        let mut data =
            self.data.clone().ok_or_else(|| ListError::MissingData { id: self.id.clone() })?;

        if let Value::Object(map) = &mut data {
            if !map.contains_key("id") && !map.contains_key("_id") {
                map.insert("id".to_string(), Value::String(self.id.clone()));
            }
        }

        serde_json::from_value(data)
            .map_err(|e| ListError::Decode { id: self.id.clone(), message: e.to_string() })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::Rating;
    use serde_json::json;

    #[test]
    fn test_event_wire_format() {
        let event: ChangeEvent = serde_json::from_value(json!({
            "collection": "ratings",
            "type": "update",
            "id": 12,
            "data": {"userName": "Kim", "stars": 3}
        }))
        .unwrap();

        assert_eq!(event.collection, Collection::Ratings);
        assert_eq!(event.kind, ChangeKind::Modified);
        assert_eq!(event.id, "12");

        let rating: Rating = event.decode().unwrap();
        assert_eq!(rating.id, "12");
        assert_eq!(rating.stars, 3);
    }

    #[test]
    fn test_unknown_collection() {
        let event: ChangeEvent = serde_json::from_value(json!({
            "collection": "stations", "type": "removed", "id": "s1"
        }))
        .unwrap();

        assert_eq!(event.collection, Collection::Other);
        assert!(matches!(event.decode::<Rating>(), Err(ListError::MissingData { .. })));
    }
}
