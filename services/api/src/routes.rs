use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch};
use axum::{Extension, Json, Router};
use review_desk::error::AppError;
use review_desk::reviews::approvals::{ApprovalChange, ApprovalStore};
use review_desk::reviews::{ReviewQuery, ReviewsPayload};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::infra::{AppState, ReviewState};

pub(crate) fn with_review_routes<S>(state: Arc<ReviewState<S>>) -> Router
where
    S: ApprovalStore + 'static,
{
    review_router(state)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) fn review_router<S>(state: Arc<ReviewState<S>>) -> Router
where
    S: ApprovalStore + 'static,
{
    Router::new()
        .route("/api/reviews/hostaway", get(hostaway_reviews_endpoint::<S>))
        .route(
            "/api/reviews/approvals",
            get(list_approvals_endpoint::<S>).post(upsert_approval_endpoint::<S>),
        )
        .route(
            "/api/reviews/:id/approve",
            patch(approve_review_endpoint::<S>),
        )
        .route("/api/reviews/google", get(google_reviews_endpoint::<S>))
        .with_state(state)
}

pub(crate) async fn healthcheck() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Normalized reviews with corpus totals; every query parameter is optional.
pub(crate) async fn hostaway_reviews_endpoint<S>(
    State(state): State<Arc<ReviewState<S>>>,
    Query(query): Query<ReviewQuery>,
) -> Result<Json<ReviewsPayload>, AppError>
where
    S: ApprovalStore + 'static,
{
    Ok(Json(state.service.get_reviews(&query).await?))
}

pub(crate) async fn list_approvals_endpoint<S>(
    State(state): State<Arc<ReviewState<S>>>,
) -> Result<Json<Value>, AppError>
where
    S: ApprovalStore + 'static,
{
    let approvals = state.service.approvals()?;
    Ok(Json(json!({ "status": "success", "result": approvals })))
}

// Bodies parse as loose JSON so that a missing or mistyped field answers
// with the documented 400 message instead of a generic rejection.
pub(crate) async fn upsert_approval_endpoint<S>(
    State(state): State<Arc<ReviewState<S>>>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError>
where
    S: ApprovalStore + 'static,
{
    let review_id = id_field(&body, "reviewId");
    let approved = body.get("approved").and_then(Value::as_bool);
    let (Some(review_id), Some(approved)) = (review_id, approved) else {
        return Err(AppError::Validation(
            "reviewId and approved are required".to_string(),
        ));
    };

    let listing_id = body
        .get("listingId")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string);

    let record = state.service.set_approval(
        &review_id,
        ApprovalChange {
            approved,
            listing_id,
        },
    )?;
    Ok(Json(json!({ "status": "success", "result": record })))
}

pub(crate) async fn approve_review_endpoint<S>(
    State(state): State<Arc<ReviewState<S>>>,
    Path(review_id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError>
where
    S: ApprovalStore + 'static,
{
    let Some(approved) = body.get("approved").and_then(Value::as_bool) else {
        return Err(AppError::Validation(
            "approved (boolean) is required".to_string(),
        ));
    };

    let record = state.service.set_approval(
        &review_id,
        ApprovalChange {
            approved,
            listing_id: None,
        },
    )?;
    Ok(Json(json!({ "status": "success", "result": record })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GoogleReviewsQuery {
    #[serde(default)]
    pub(crate) place_id: Option<String>,
}

pub(crate) async fn google_reviews_endpoint<S>(
    State(state): State<Arc<ReviewState<S>>>,
    Query(query): Query<GoogleReviewsQuery>,
) -> Result<Response, AppError>
where
    S: ApprovalStore + 'static,
{
    let Some(google) = &state.google else {
        let payload = json!({
            "status": "disabled",
            "message": "Set GOOGLE_PLACES_API_KEY to enable this route",
        });
        return Ok(Json(payload).into_response());
    };

    let Some(place_id) = query
        .place_id
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
    else {
        return Err(AppError::Validation("placeId is required".to_string()));
    };

    let reviews = google.fetch_place_reviews(place_id).await?;
    let payload = json!({ "status": "success", "count": reviews.len(), "result": reviews });
    Ok(Json(payload).into_response())
}

fn id_field(body: &Value, key: &str) -> Option<String> {
    match body.get(key) {
        Some(Value::String(value)) if !value.trim().is_empty() => Some(value.trim().to_string()),
        Some(Value::Number(value)) => Some(value.to_string()),
        _ => None,
    }
}
