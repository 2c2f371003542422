use serde_json::Value;

// Alias chains per canonical attribute, first-present-wins. Adding a provider
// schema variant is an edit to one of these tables, not a new conditional.
pub(crate) const LISTING_NAME: &[&str] = &["listingName", "listing_title"];
pub(crate) const LISTING_ID: &[&str] = &["listingId", "listing_id"];
pub(crate) const REVIEW_ID: &[&str] = &["id", "reviewId"];
pub(crate) const REVIEW_TYPE: &[&str] = &["type", "review_type"];
pub(crate) const STATUS: &[&str] = &["status"];
pub(crate) const REVIEWER_NAME: &[&str] = &["guestName", "reviewer_name"];
pub(crate) const SUBMITTED_AT: &[&str] = &["submittedAt", "created_at", "updated_at"];
pub(crate) const TEXT_PUBLIC: &[&str] = &["publicReview", "public_review", "review_text"];
pub(crate) const CHANNEL: &[&str] = &["channel", "platform"];
pub(crate) const RATING: &[&str] = &["rating"];

pub(crate) const CATEGORY_LIST: &str = "reviewCategory";

/// First candidate carrying a non-blank string wins.
pub(crate) fn first_string(raw: &Value, candidates: &[&str]) -> Option<String> {
    candidates.iter().find_map(|field| {
        raw.get(field)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    })
}

/// Identifier fields arrive as strings or bare numbers depending on the
/// provider; both resolve to their string form.
pub(crate) fn first_id(raw: &Value, candidates: &[&str]) -> Option<String> {
    candidates.iter().find_map(|field| match raw.get(field) {
        Some(Value::String(value)) if !value.trim().is_empty() => Some(value.trim().to_string()),
        Some(Value::Number(value)) => Some(value.to_string()),
        _ => None,
    })
}

pub(crate) fn first_number(raw: &Value, candidates: &[&str]) -> Option<f64> {
    candidates
        .iter()
        .find_map(|field| raw.get(field).and_then(Value::as_f64))
}
