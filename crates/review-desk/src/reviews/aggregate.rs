use super::domain::{Review, Totals};

/// Summary totals over the full normalized set, computed before any filter
/// runs. The dashboard shows "N total / M approved" regardless of which
/// filters shape the returned list, so this never sees a filtered view.
pub fn totals(reviews: &[Review]) -> Totals {
    let mut totals = Totals {
        all: reviews.len(),
        ..Totals::default()
    };

    for review in reviews {
        if review.approved {
            totals.approved += 1;
        }
        let channel = if review.channel.trim().is_empty() {
            "unknown"
        } else {
            review.channel.as_str()
        };
        *totals.by_channel.entry(channel.to_string()).or_insert(0) += 1;
        *totals
            .by_listing
            .entry(review.listing_id.clone())
            .or_insert(0) += 1;
    }

    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reviews::approvals::ApprovalsSnapshot;
    use crate::reviews::normalize;
    use serde_json::json;

    fn normalized_set() -> Vec<Review> {
        [
            json!({ "id": 1, "listingName": "Flat A", "channel": "airbnb" }),
            json!({ "id": 2, "listingName": "Flat A", "channel": "airbnb" }),
            json!({ "id": 3, "listingName": "Flat B", "channel": "" }),
        ]
        .iter()
        .map(|raw| normalize::normalize(raw, &ApprovalsSnapshot::new()))
        .collect()
    }

    #[test]
    fn counts_cover_the_whole_corpus() {
        let mut reviews = normalized_set();
        reviews[0].approved = true;

        let totals = totals(&reviews);
        assert_eq!(totals.all, 3);
        assert_eq!(totals.approved, 1);
        assert_eq!(totals.by_channel.get("airbnb"), Some(&2));
        assert_eq!(totals.by_listing.get("flat-a"), Some(&2));
        assert_eq!(totals.by_listing.get("flat-b"), Some(&1));
    }

    #[test]
    fn blank_channel_counts_under_unknown() {
        let totals = totals(&normalized_set());
        // A raw empty channel normalizes to "direct"; force the blank case.
        assert_eq!(totals.by_channel.get("unknown"), None);

        let mut reviews = normalized_set();
        reviews[2].channel = String::new();
        let totals = super::totals(&reviews);
        assert_eq!(totals.by_channel.get("unknown"), Some(&1));
    }

    #[test]
    fn empty_corpus_produces_zeroed_totals() {
        let totals = totals(&[]);
        assert_eq!(totals.all, 0);
        assert_eq!(totals.approved, 0);
        assert!(totals.by_channel.is_empty());
        assert!(totals.by_listing.is_empty());
    }
}
