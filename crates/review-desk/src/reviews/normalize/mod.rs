mod mapping;
mod rating;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

use super::approvals::ApprovalsSnapshot;
use super::domain::{iso_millis, Review, ReviewSource};

/// Normalize one raw Hostaway review into the canonical shape.
///
/// Pure given its two inputs: no field ever aborts the record, every gap
/// falls back to the documented default, and the approval flag comes solely
/// from the supplied snapshot (an absent entry means unapproved).
pub fn normalize(raw: &Value, approvals: &ApprovalsSnapshot) -> Review {
    let listing_name = mapping::first_string(raw, mapping::LISTING_NAME)
        .unwrap_or_else(|| "Unknown Listing".to_string());
    let listing_id = mapping::first_id(raw, mapping::LISTING_ID)
        .unwrap_or_else(|| slugify(&listing_name));
    let submitted_at =
        mapping::first_string(raw, mapping::SUBMITTED_AT).and_then(|value| parse_datetime(&value));
    let id = mapping::first_id(raw, mapping::REVIEW_ID)
        .unwrap_or_else(|| synthesized_id(&listing_id, submitted_at.as_ref()));
    let approved = approvals
        .get(&id)
        .map(|record| record.approved)
        .unwrap_or(false);

    Review {
        source: ReviewSource::Hostaway,
        review_type: mapping::first_string(raw, mapping::REVIEW_TYPE)
            .unwrap_or_else(|| "guest-to-host".to_string()),
        status: mapping::first_string(raw, mapping::STATUS)
            .unwrap_or_else(|| "published".to_string()),
        reviewer_name: mapping::first_string(raw, mapping::REVIEWER_NAME),
        rating_overall: rating::overall(raw),
        rating_scale: 5,
        category_ratings: rating::categories(raw),
        text_public: mapping::first_string(raw, mapping::TEXT_PUBLIC).unwrap_or_default(),
        channel: mapping::first_string(raw, mapping::CHANNEL)
            .unwrap_or_else(|| "direct".to_string()),
        id,
        listing_id,
        listing_name,
        submitted_at,
        approved,
    }
}

/// Lowercased, hyphen-joined identifier derived from free text. Runs of
/// non-alphanumerics collapse to one hyphen; leading/trailing hyphens drop.
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    for c in value.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_matches('-').to_string()
}

/// Tolerant provider-date parsing. Space-separated timestamps are taken as
/// UTC; anything unparseable is simply "no date", never a batch failure.
pub(crate) fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    if let Ok(fixed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(fixed.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S") {
        return Some(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }

    None
}

// Approvals key off this id, so two no-id reviews with the same listing and
// an unparseable date collapse to one logical review. Pinned by tests below.
fn synthesized_id(listing_id: &str, submitted_at: Option<&DateTime<Utc>>) -> String {
    match submitted_at {
        Some(at) => format!("{listing_id}-{}", iso_millis(at)),
        None => format!("{listing_id}-null"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reviews::domain::ApprovalRecord;
    use serde_json::json;

    #[test]
    fn hostaway_record_normalizes_to_pinned_canonical_shape() {
        let raw = json!({
            "id": 1,
            "listingName": "Flat A",
            "rating": 9,
            "submittedAt": "2024-01-02 10:00:00",
        });
        let review = normalize(&raw, &ApprovalsSnapshot::new());

        assert_eq!(review.id, "1");
        assert_eq!(review.listing_id, "flat-a");
        assert_eq!(review.rating_overall, Some(4.5));
        assert_eq!(
            review.submitted_at.map(|at| iso_millis(&at)).as_deref(),
            Some("2024-01-02T10:00:00.000Z")
        );
        assert!(!review.approved);
        assert_eq!(review.review_type, "guest-to-host");
        assert_eq!(review.status, "published");
        assert_eq!(review.channel, "direct");
        assert_eq!(review.text_public, "");
    }

    #[test]
    fn alternate_field_names_map_onto_the_same_attributes() {
        let raw = json!({
            "reviewId": "r-42",
            "listing_title": "Shoreditch Heights",
            "listing_id": "SH-2B",
            "review_type": "host-to-guest",
            "reviewer_name": "Amira",
            "created_at": "2024-05-10 08:30:00",
            "review_text": "Tidy guests",
            "platform": "booking.com",
        });
        let review = normalize(&raw, &ApprovalsSnapshot::new());

        assert_eq!(review.id, "r-42");
        assert_eq!(review.listing_id, "SH-2B");
        assert_eq!(review.listing_name, "Shoreditch Heights");
        assert_eq!(review.review_type, "host-to-guest");
        assert_eq!(review.reviewer_name.as_deref(), Some("Amira"));
        assert_eq!(review.text_public, "Tidy guests");
        assert_eq!(review.channel, "booking.com");
        assert!(review.submitted_at.is_some());
    }

    #[test]
    fn missing_listing_id_slugifies_the_listing_name() {
        let raw = json!({ "id": 2, "listingName": "2B N1 A - 29 Shoreditch Heights" });
        let review = normalize(&raw, &ApprovalsSnapshot::new());
        assert_eq!(review.listing_id, "2b-n1-a-29-shoreditch-heights");
    }

    #[test]
    fn missing_provider_id_synthesizes_from_listing_and_date() {
        let raw = json!({ "listingName": "Flat A", "submittedAt": "2024-01-02 10:00:00" });
        let review = normalize(&raw, &ApprovalsSnapshot::new());
        assert_eq!(review.id, "flat-a-2024-01-02T10:00:00.000Z");
    }

    #[test]
    fn null_date_reviews_on_one_listing_collapse_to_one_id() {
        let first = normalize(
            &json!({ "listingName": "Flat A", "submittedAt": "not a date" }),
            &ApprovalsSnapshot::new(),
        );
        let second = normalize(&json!({ "listingName": "Flat A" }), &ApprovalsSnapshot::new());

        // Current behavior, kept deliberately: both synthesize `flat-a-null`.
        assert_eq!(first.id, "flat-a-null");
        assert_eq!(first.id, second.id);
        assert!(first.submitted_at.is_none());
    }

    #[test]
    fn approval_flag_comes_from_snapshot_and_defaults_false() {
        let raw = json!({ "id": 7453, "listingName": "Flat A" });
        let mut approvals = ApprovalsSnapshot::new();
        approvals.insert(
            "7453".to_string(),
            ApprovalRecord {
                approved: true,
                listing_id: None,
                updated_at: chrono::Utc::now(),
            },
        );

        assert!(normalize(&raw, &approvals).approved);
        assert!(!normalize(&raw, &ApprovalsSnapshot::new()).approved);
    }

    #[test]
    fn parse_datetime_accepts_known_shapes_and_rejects_garbage() {
        for value in [
            "2024-01-02 10:00:00",
            "2024-01-02T10:00:00Z",
            "2024-01-02T10:00:00+02:00",
            "2024-01-02T10:00:00",
            "2024-01-02",
        ] {
            assert!(parse_datetime(value).is_some(), "should parse {value}");
        }
        assert!(parse_datetime("").is_none());
        assert!(parse_datetime("  ").is_none());
        assert!(parse_datetime("last tuesday").is_none());
        assert!(parse_datetime("2024-13-40 99:00:00").is_none());
    }

    #[test]
    fn slugify_collapses_runs_and_trims_edges() {
        assert_eq!(slugify("Flat A"), "flat-a");
        assert_eq!(slugify("  2B - N1(A) "), "2b-n1-a");
        assert_eq!(slugify("!!!"), "");
    }
}
