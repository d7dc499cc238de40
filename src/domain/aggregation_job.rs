//! Staged aggregation job model.

use serde::{Deserialize, Serialize};

use crate::domain::entities::Rating;

/// Surrogate of an accepted rating waiting in the staging store.
///
/// Written by rating intake under a fresh key and consumed exactly once by
/// [`crate::workers::AggregationWorker`], whether or not it ends up in the
/// provider's average.
///
/// Stored as a flat JSON record: `{"providerId":1,"userId":7,"ratingValue":5}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingAggregationJob {
    pub provider_id: i64,
    pub user_id: i64,
    pub rating_value: i32,
}

impl PendingAggregationJob {
    pub fn new(provider_id: i64, user_id: i64, rating_value: i32) -> Self {
        Self {
            provider_id,
            user_id,
            rating_value,
        }
    }
}

impl From<&Rating> for PendingAggregationJob {
    fn from(rating: &Rating) -> Self {
        Self::new(rating.provider_id, rating.user_id, rating.rating_value)
    }
}
