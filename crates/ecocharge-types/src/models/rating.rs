//! Station ratings.

use serde::{Deserialize, Serialize};

use super::ids::{opt_string_or_number, string_or_number};

/// A user's rating of a charging station.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    /// Server-side identifier
    #[serde(alias = "_id", deserialize_with = "string_or_number")]
    pub id: String,
    /// Station the rating refers to, if the API tracks it
    #[serde(default, deserialize_with = "opt_string_or_number", skip_serializing_if = "Option::is_none")]
    pub station_id: Option<String>,
    /// Name shown next to the rating
    #[serde(alias = "name")]
    pub user_name: String,
    /// Email of the rater
    #[serde(default, alias = "email", skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
    /// Star count, 1 to 5
    #[serde(alias = "rating")]
    pub stars: u8,
    /// Free-form feedback
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Creation timestamp as reported by the API
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Last edit timestamp as reported by the API
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Aggregate view over a list of ratings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct RatingSummary {
    /// Number of ratings counted
    pub count: usize,
    /// Mean star value, 0.0 when there are no ratings
    pub average: f64,
    /// Ratings per star value; index 0 holds one-star ratings
    pub histogram: [usize; 5],
}

impl RatingSummary {
    /// Summarize ratings. Star values outside 1..=5 are skipped.
    pub fn from_ratings<'a>(ratings: impl IntoIterator<Item = &'a Rating>) -> Self {
        let mut summary = Self::default();
        let mut total: u64 = 0;

        for rating in ratings {
            if !(1..=5).contains(&rating.stars) {
                continue;
            }
            summary.histogram[usize::from(rating.stars - 1)] += 1;
            summary.count += 1;
            total += u64::from(rating.stars);
        }

        if summary.count > 0 {
            summary.average = total as f64 / summary.count as f64;
        }
        summary
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn rating(id: &str, stars: u8) -> Rating {
        Rating {
            id: id.to_string(),
            station_id: None,
            user_name: "Ana".to_string(),
            user_email: None,
            stars,
            comment: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_summary_average_and_histogram() {
        let ratings = vec![rating("1", 5), rating("2", 4), rating("3", 5), rating("4", 0)];
        let summary = RatingSummary::from_ratings(&ratings);

        assert_eq!(summary.count, 3);
        assert_eq!(summary.histogram, [0, 0, 0, 1, 2]);
        assert!((summary.average - 14.0 / 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_summary_empty() {
        let summary = RatingSummary::from_ratings(&[]);
        assert_eq!(summary.count, 0);
        assert_eq!(summary.average, 0.0);
    }

    #[test]
    fn test_rating_decodes_api_aliases() {
        let json = r#"{"_id":7,"stationId":3,"name":"Li","rating":4,"comment":"ok"}"#;
        let r: Rating = serde_json::from_str(json).unwrap();

        assert_eq!(r.id, "7");
        assert_eq!(r.station_id.as_deref(), Some("3"));
        assert_eq!(r.user_name, "Li");
        assert_eq!(r.stars, 4);
    }
}
