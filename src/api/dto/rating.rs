//! DTOs for rating intake.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::{Rating, RatingSubmission};

/// Request body of `POST /api/ratings`.
///
/// Range and id checks happen in [`RatingSubmission::validate`] so that every
/// intake path applies the same rules.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRatingRequest {
    pub provider_id: i64,
    pub user_id: i64,
    pub rating_value: i32,
}

impl From<SubmitRatingRequest> for RatingSubmission {
    fn from(req: SubmitRatingRequest) -> Self {
        RatingSubmission::new(req.provider_id, req.user_id, req.rating_value)
    }
}

/// An accepted rating. Its effect on the provider average is asynchronous.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingResponse {
    pub id: i64,
    pub provider_id: i64,
    pub user_id: i64,
    pub rating_value: i32,
    pub created_at: DateTime<Utc>,
}

impl From<Rating> for RatingResponse {
    fn from(r: Rating) -> Self {
        Self {
            id: r.id,
            provider_id: r.provider_id,
            user_id: r.user_id,
            rating_value: r.rating_value,
            created_at: r.created_at,
        }
    }
}
