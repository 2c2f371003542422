use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};

/// Provider a review originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewSource {
    Hostaway,
    Google,
}

/// Canonical review record, immutable once produced for a request. Both the
/// moderation dashboard and the public property page consume this shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    pub source: ReviewSource,
    #[serde(rename = "type")]
    pub review_type: String,
    pub status: String,
    pub listing_id: String,
    pub listing_name: String,
    pub reviewer_name: Option<String>,
    #[serde(serialize_with = "serialize_submitted_at")]
    pub submitted_at: Option<DateTime<Utc>>,
    pub rating_overall: Option<f64>,
    /// Always 5; ratings are unified onto the 0-5 scale during normalization.
    pub rating_scale: u8,
    pub category_ratings: BTreeMap<String, f64>,
    pub text_public: String,
    pub channel: String,
    pub approved: bool,
}

/// Aggregate counters over the full normalized corpus. Recomputed per
/// request, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub all: usize,
    pub approved: usize,
    pub by_channel: BTreeMap<String, usize>,
    pub by_listing: BTreeMap<String, usize>,
}

/// Moderator decision persisted per review id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalRecord {
    pub approved: bool,
    #[serde(default)]
    pub listing_id: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Millisecond-precision ISO-8601 with a `Z` suffix; the format both
/// front-end consumers sort and display.
pub(crate) fn iso_millis(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn serialize_submitted_at<S>(
    value: &Option<DateTime<Utc>>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(at) => serializer.serialize_str(&iso_millis(at)),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_review() -> Review {
        Review {
            id: "7453".to_string(),
            source: ReviewSource::Hostaway,
            review_type: "guest-to-host".to_string(),
            status: "published".to_string(),
            listing_id: "flat-a".to_string(),
            listing_name: "Flat A".to_string(),
            reviewer_name: Some("Shane".to_string()),
            submitted_at: Utc.with_ymd_and_hms(2024, 1, 2, 10, 0, 0).single(),
            rating_overall: Some(4.5),
            rating_scale: 5,
            category_ratings: BTreeMap::from([("cleanliness".to_string(), 5.0)]),
            text_public: "Great stay".to_string(),
            channel: "airbnb".to_string(),
            approved: false,
        }
    }

    #[test]
    fn review_serializes_with_camel_case_contract_fields() {
        let value = serde_json::to_value(sample_review()).expect("review serializes");
        assert_eq!(value["type"], "guest-to-host");
        assert_eq!(value["listingId"], "flat-a");
        assert_eq!(value["ratingOverall"], 4.5);
        assert_eq!(value["ratingScale"], 5);
        assert_eq!(value["categoryRatings"]["cleanliness"], 5.0);
        assert_eq!(value["source"], "hostaway");
    }

    #[test]
    fn submitted_at_serializes_with_millisecond_z_suffix() {
        let value = serde_json::to_value(sample_review()).expect("review serializes");
        assert_eq!(value["submittedAt"], "2024-01-02T10:00:00.000Z");

        let mut review = sample_review();
        review.submitted_at = None;
        let value = serde_json::to_value(review).expect("review serializes");
        assert!(value["submittedAt"].is_null());
    }

    #[test]
    fn approval_record_round_trips_without_listing() {
        let json = r#"{"approved":true,"updatedAt":"2024-03-01T08:00:00.000Z"}"#;
        let record: ApprovalRecord = serde_json::from_str(json).expect("record parses");
        assert!(record.approved);
        assert!(record.listing_id.is_none());
    }
}
