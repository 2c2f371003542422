use clap::Args;
use review_desk::error::AppError;
use review_desk::reviews::aggregate;
use review_desk::reviews::approvals::{ApprovalChange, ApprovalStore, InMemoryApprovalStore};
use review_desk::reviews::{filter, normalize, Review, ReviewQuery};
use serde_json::{json, Value};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Only print reviews for this listing id or name slug
    #[arg(long)]
    listing: Option<String>,
    /// Mark every sample review approved before printing
    #[arg(long)]
    approve_all: bool,
}

/// Walk the full pipeline over a bundled sample payload and print what the
/// dashboard would see. No network, no files.
pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let raw = sample_payload();
    let store = InMemoryApprovalStore::default();

    if args.approve_all {
        for record in &raw {
            let preview = normalize(record, &Default::default());
            store.upsert(
                &preview.id,
                ApprovalChange {
                    approved: true,
                    listing_id: Some(preview.listing_id.clone()),
                },
            )?;
        }
    }

    let approvals = store.read_all()?;
    let normalized: Vec<Review> = raw
        .iter()
        .map(|record| normalize(record, &approvals))
        .collect();
    let totals = aggregate::totals(&normalized);

    let query = ReviewQuery {
        listing_id: args.listing,
        ..Default::default()
    };
    let visible = filter::apply(normalized, &query);

    println!("== Review Desk demo ==");
    println!(
        "{} reviews normalized, {} approved",
        totals.all, totals.approved
    );
    for (channel, count) in &totals.by_channel {
        println!("  channel {channel}: {count}");
    }
    for (listing, count) in &totals.by_listing {
        println!("  listing {listing}: {count}");
    }

    println!("-- visible reviews ({}) --", visible.len());
    for review in &visible {
        println!(
            "[{}] {} | {} | rating {} | approved: {}",
            review.id,
            review.listing_name,
            review
                .reviewer_name
                .as_deref()
                .unwrap_or("anonymous"),
            review
                .rating_overall
                .map(|rating| rating.to_string())
                .unwrap_or_else(|| "n/a".to_string()),
            review.approved,
        );
        if !review.text_public.is_empty() {
            println!("    \"{}\"", review.text_public);
        }
    }

    Ok(())
}

fn sample_payload() -> Vec<Value> {
    vec![
        json!({
            "id": 7453,
            "type": "host-to-guest",
            "rating": null,
            "publicReview": "Shane and family are wonderful! Would definitely host again :)",
            "reviewCategory": [
                { "category": "cleanliness", "rating": 10 },
                { "category": "communication", "rating": 10 },
                { "category": "respect_house_rules", "rating": 10 }
            ],
            "submittedAt": "2020-08-21 22:45:14",
            "guestName": "Shane Finkelstein",
            "listingName": "2B N1 A - 29 Shoreditch Heights",
            "channel": "airbnb"
        }),
        json!({
            "id": 7510,
            "rating": 9,
            "publicReview": "Spotless flat, wonderful check-in.",
            "submittedAt": "2024-01-02 10:00:00",
            "guestName": "Dana Whitcombe",
            "listingName": "Flat A",
            "channel": "booking.com"
        }),
        json!({
            "id": 7511,
            "rating": 3,
            "publicReview": "Noisy street side, would not return.",
            "submittedAt": "2024-02-11 18:20:00",
            "guestName": "Pieter Hulst",
            "listingName": "Flat A",
            "channel": "airbnb"
        }),
        json!({
            "listing_title": "Camden Lofts 3C",
            "review_text": "Arrived via the legacy exporter, minimal fields.",
            "platform": "direct"
        }),
    ]
}
