//! Google Places exploration: place reviews arrive already on the 5-point
//! scale and map straight into the canonical shape, never pre-approved.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::SourceError;
use crate::reviews::domain::{Review, ReviewSource};
use crate::reviews::normalize::slugify;

const PLACE_DETAILS_URL: &str = "https://maps.googleapis.com/maps/api/place/details/json";

#[derive(Debug, Deserialize)]
struct PlaceDetailsEnvelope {
    #[serde(default)]
    result: Option<PlaceDetails>,
}

#[derive(Debug, Default, Deserialize)]
struct PlaceDetails {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    reviews: Vec<PlaceReview>,
}

#[derive(Debug, Deserialize)]
struct PlaceReview {
    #[serde(default)]
    author_name: Option<String>,
    #[serde(default)]
    rating: Option<f64>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    time: Option<i64>,
}

pub struct GooglePlacesSource {
    client: reqwest::Client,
    api_key: String,
}

impl GooglePlacesSource {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
        }
    }

    pub async fn fetch_place_reviews(&self, place_id: &str) -> Result<Vec<Review>, SourceError> {
        let response = self
            .client
            .get(PLACE_DETAILS_URL)
            .query(&[
                ("place_id", place_id),
                ("fields", "rating,user_ratings_total,reviews,name"),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: PlaceDetailsEnvelope = response.json().await?;
        Ok(map_place_reviews(envelope.result.unwrap_or_default()))
    }
}

fn map_place_reviews(details: PlaceDetails) -> Vec<Review> {
    let listing_name = details
        .name
        .unwrap_or_else(|| "Google Place".to_string());
    let listing_id = slugify(&listing_name);

    details
        .reviews
        .into_iter()
        .enumerate()
        .map(|(index, review)| Review {
            // The review epoch doubles as a stable id; position otherwise.
            id: review
                .time
                .map(|epoch| epoch.to_string())
                .unwrap_or_else(|| index.to_string()),
            source: ReviewSource::Google,
            review_type: "guest-to-host".to_string(),
            status: "published".to_string(),
            listing_id: listing_id.clone(),
            listing_name: listing_name.clone(),
            reviewer_name: review.author_name,
            submitted_at: review
                .time
                .and_then(|epoch| DateTime::<Utc>::from_timestamp(epoch, 0)),
            rating_overall: review.rating,
            rating_scale: 5,
            category_ratings: BTreeMap::new(),
            text_public: review.text.unwrap_or_default(),
            channel: "google".to_string(),
            approved: false,
        })
        .collect()
}
