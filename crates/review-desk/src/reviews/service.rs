use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use crate::error::AppError;
use super::aggregate;
use super::approvals::{ApprovalChange, ApprovalStore, ApprovalsSnapshot};
use super::domain::{ApprovalRecord, Review, Totals};
use super::filter::{self, ReviewQuery};
use super::normalize;
use super::sources::{RawReviewBatch, RawReviewSource};

/// Response envelope served to both the moderation dashboard and the public
/// property page.
#[derive(Debug, Serialize)]
pub struct ReviewsPayload {
    pub status: &'static str,
    pub count: usize,
    pub totals: Totals,
    pub result: Vec<Review>,
}

/// Orchestrates one request: snapshot approvals, fetch raw reviews,
/// normalize everything, aggregate the complete set, then filter. Totals and
/// the filtered list always come from the same normalized set.
pub struct ReviewService<S> {
    store: Arc<S>,
    live: Option<Arc<dyn RawReviewSource>>,
    mock: Arc<dyn RawReviewSource>,
}

impl<S: ApprovalStore> ReviewService<S> {
    pub fn new(
        store: Arc<S>,
        live: Option<Arc<dyn RawReviewSource>>,
        mock: Arc<dyn RawReviewSource>,
    ) -> Self {
        Self { store, live, mock }
    }

    fn source_for(&self, query: &ReviewQuery) -> &Arc<dyn RawReviewSource> {
        if query.wants_mock() {
            return &self.mock;
        }
        self.live.as_ref().unwrap_or(&self.mock)
    }

    pub async fn get_reviews(&self, query: &ReviewQuery) -> Result<ReviewsPayload, AppError> {
        let approvals = self.store.read_all()?;

        // Any fetch failure resolves to an empty list; a broken provider
        // must never take the dashboard down.
        let batch = match self.source_for(query).fetch().await {
            Ok(batch) => batch,
            Err(err) => {
                warn!(error = %err, "review source failed, serving empty batch");
                RawReviewBatch::default()
            }
        };

        let normalized: Vec<Review> = batch
            .result
            .iter()
            .map(|raw| normalize::normalize(raw, &approvals))
            .collect();
        let totals = aggregate::totals(&normalized);
        let result = filter::apply(normalized, query);

        Ok(ReviewsPayload {
            status: "success",
            count: result.len(),
            totals,
            result,
        })
    }

    /// Raw approvals snapshot for the moderation dashboard.
    pub fn approvals(&self) -> Result<ApprovalsSnapshot, AppError> {
        Ok(self.store.read_all()?)
    }

    pub fn set_approval(
        &self,
        review_id: &str,
        change: ApprovalChange,
    ) -> Result<ApprovalRecord, AppError> {
        let review_id = review_id.trim();
        if review_id.is_empty() {
            return Err(AppError::Validation(
                "reviewId and approved are required".to_string(),
            ));
        }
        Ok(self.store.upsert(review_id, change)?)
    }
}
