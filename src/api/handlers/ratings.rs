//! Handler for rating intake.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::rating::{RatingResponse, SubmitRatingRequest};
use crate::error::AppError;
use crate::state::AppState;

/// Accepts a rating for asynchronous aggregation.
///
/// # Endpoint
///
/// `POST /api/ratings`
///
/// # Request
///
/// ```json
/// { "providerId": 1, "userId": 7, "ratingValue": 5 }
/// ```
///
/// # Response
///
/// **202 Accepted** with the persisted rating. The provider's average is
/// updated later by the aggregation worker, and only while the provider is
/// under its daily limit.
///
/// # Errors
///
/// Returns 400 if an id is not positive or the value is outside 1-5.
/// Returns 404 if the provider or user does not exist.
/// Returns 503 if the staging store or event bus is unreachable.
pub async fn submit_rating_handler(
    State(state): State<AppState>,
    Json(payload): Json<SubmitRatingRequest>,
) -> Result<(StatusCode, Json<RatingResponse>), AppError> {
    let rating = state.rating_service.submit(payload.into()).await?;

    Ok((StatusCode::ACCEPTED, Json(rating.into())))
}
