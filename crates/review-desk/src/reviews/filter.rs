use std::collections::HashSet;

use serde::Deserialize;

use super::domain::Review;
use super::normalize::{parse_datetime, slugify};

/// Query parameters consumed by the filter engine, all optional strings. A
/// blank or unparseable parameter disables its predicate rather than erroring.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewQuery {
    #[serde(default)]
    pub listing_id: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default, rename = "type")]
    pub review_type: Option<String>,
    #[serde(default)]
    pub approved_only: Option<String>,
    #[serde(default)]
    pub min_rating: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    /// Transport flag, not a filter: forces the mock source for this request.
    #[serde(default)]
    pub use_mock: Option<String>,
}

impl ReviewQuery {
    pub fn wants_mock(&self) -> bool {
        self.use_mock.as_deref() == Some("true")
    }

    fn wants_approved_only(&self) -> bool {
        // Only the literal string "true" triggers the predicate.
        self.approved_only.as_deref() == Some("true")
    }

    fn min_rating_threshold(&self) -> Option<f64> {
        trimmed(&self.min_rating)?.parse().ok()
    }
}

/// Apply every active predicate, AND-composed. Order of application never
/// changes the outcome; no sorting happens here (presentation ordering is the
/// consumer's concern).
pub fn apply(reviews: Vec<Review>, query: &ReviewQuery) -> Vec<Review> {
    let mut filtered = reviews;

    if let Some(listing) = trimmed(&query.listing_id) {
        let wanted = listing.to_lowercase();
        // Raw data may expose a raw id or only a name, so the predicate
        // matches either the id or the slug of the name.
        filtered.retain(|review| {
            review.listing_id.to_lowercase() == wanted || slugify(&review.listing_name) == wanted
        });
    }
    if let Some(channels) = list_set(&query.channel) {
        filtered.retain(|review| channels.contains(&review.channel.to_lowercase()));
    }
    if let Some(types) = list_set(&query.review_type) {
        filtered.retain(|review| types.contains(&review.review_type.to_lowercase()));
    }
    if query.wants_approved_only() {
        filtered.retain(|review| review.approved);
    }
    if let Some(min) = query.min_rating_threshold() {
        filtered.retain(|review| review.rating_overall.map(|r| r >= min).unwrap_or(false));
    }

    let start = trimmed(&query.start_date).and_then(parse_datetime);
    let end = trimmed(&query.end_date).and_then(parse_datetime);
    if start.is_some() || end.is_some() {
        filtered.retain(|review| {
            let Some(at) = review.submitted_at else {
                return false;
            };
            if start.map(|bound| at < bound).unwrap_or(false) {
                return false;
            }
            if end.map(|bound| at > bound).unwrap_or(false) {
                return false;
            }
            true
        });
    }

    filtered
}

fn trimmed(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Comma-separated, case-insensitive membership set; empty input means the
/// predicate is inactive.
fn list_set(value: &Option<String>) -> Option<HashSet<String>> {
    let raw = trimmed(value)?;
    let set: HashSet<String> = raw
        .split(',')
        .map(|item| item.trim().to_lowercase())
        .filter(|item| !item.is_empty())
        .collect();
    if set.is_empty() {
        None
    } else {
        Some(set)
    }
}
