use std::collections::BTreeMap;

use serde_json::Value;

use super::mapping;

/// Overall 0-5 rating with one-decimal precision, or `None` when the record
/// carries no usable rating data.
///
/// A direct numeric `rating` wins; values above 5 are assumed to be on the
/// provider's 10-point scale and halved. Otherwise the mean of the
/// per-category scores (10-point) is halved.
pub(crate) fn overall(raw: &Value) -> Option<f64> {
    if let Some(direct) = mapping::first_number(raw, mapping::RATING) {
        return Some(if direct > 5.0 {
            round_to_five_scale(direct)
        } else {
            direct
        });
    }

    let values: Vec<f64> = category_entries(raw)
        .map(|(_, score)| score)
        .collect();
    if values.is_empty() {
        return None;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    Some(round_to_five_scale(mean))
}

/// Per-category scores keyed by a lowercased, underscore-joined label.
///
/// The halving test is per-value, not per-record: a category score that is
/// already <=5 passes through untouched even when siblings are on the
/// 10-point scale. Provider semantics for a literal 5 are ambiguous; this
/// preserves the threshold rather than guessing.
pub(crate) fn categories(raw: &Value) -> BTreeMap<String, f64> {
    let mut out = BTreeMap::new();
    for (label, score) in category_entries(raw) {
        let value = if score > 5.0 { score / 2.0 } else { score };
        out.insert(category_key(label), value);
    }
    out
}

fn category_entries<'a>(raw: &'a Value) -> impl Iterator<Item = (&'a str, f64)> + 'a {
    raw.get(mapping::CATEGORY_LIST)
        .and_then(Value::as_array)
        .map(|entries| entries.as_slice())
        .unwrap_or_default()
        .iter()
        .filter_map(|entry| {
            let score = entry.get("rating").and_then(Value::as_f64)?;
            let label = entry.get("category").and_then(Value::as_str).unwrap_or("");
            Some((label, score))
        })
}

fn round_to_five_scale(ten_scale: f64) -> f64 {
    ((ten_scale / 2.0) * 10.0).round() / 10.0
}

fn category_key(label: &str) -> String {
    let mut key = String::with_capacity(label.len());
    for c in label.chars() {
        if c.is_ascii_alphanumeric() {
            key.push(c.to_ascii_lowercase());
        } else if !key.ends_with('_') {
            key.push('_');
        }
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn direct_rating_at_or_below_five_passes_through() {
        assert_eq!(overall(&json!({ "rating": 4.5 })), Some(4.5));
        assert_eq!(overall(&json!({ "rating": 5 })), Some(5.0));
    }

    #[test]
    fn direct_rating_above_five_is_halved_and_rounded() {
        assert_eq!(overall(&json!({ "rating": 9 })), Some(4.5));
        assert_eq!(overall(&json!({ "rating": 7 })), Some(3.5));
        assert_eq!(overall(&json!({ "rating": 9.3 })), Some(4.7));
    }

    #[test]
    fn category_mean_is_halved_when_no_direct_rating() {
        let raw = json!({
            "reviewCategory": [
                { "category": "cleanliness", "rating": 8 },
                { "category": "communication", "rating": 10 },
                { "category": "location", "rating": 6 },
            ]
        });
        assert_eq!(overall(&raw), Some(4.0));
    }

    #[test]
    fn missing_rating_data_yields_none() {
        assert_eq!(overall(&json!({})), None);
        assert_eq!(overall(&json!({ "rating": "nine" })), None);
        assert_eq!(overall(&json!({ "reviewCategory": [] })), None);
        assert_eq!(
            overall(&json!({ "reviewCategory": [{ "category": "x" }] })),
            None
        );
    }

    #[test]
    fn category_values_are_halved_per_value_not_per_record() {
        let raw = json!({
            "reviewCategory": [
                { "category": "Cleanliness", "rating": 10 },
                { "category": "check-in", "rating": 5 },
            ]
        });
        let map = categories(&raw);
        assert_eq!(map.get("cleanliness"), Some(&5.0));
        // A literal 5 on a 10-point survey is indistinguishable from an
        // already-normalized 5/5 and stays un-halved.
        assert_eq!(map.get("check_in"), Some(&5.0));
    }

    #[test]
    fn category_keys_collapse_non_alphanumeric_runs() {
        let raw = json!({
            "reviewCategory": [
                { "category": "Respect house rules!", "rating": 9 },
            ]
        });
        let map = categories(&raw);
        assert_eq!(map.get("respect_house_rules_"), Some(&4.5));
    }
}
