//! Rating intake service.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::domain::aggregation_job::PendingAggregationJob;
use crate::domain::entities::{NewRating, Rating, RatingSubmission};
use crate::domain::events::RateCreatedEvent;
use crate::domain::repositories::RatingRepository;
use crate::error::AppError;
use crate::infrastructure::cache::{CacheService, average_rating_key};
use crate::infrastructure::event_bus::EventBus;
use crate::infrastructure::staging::StagingStore;
use crate::utils::Clock;

/// Accepts ratings and hands them to the asynchronous pipeline.
///
/// A successful [`RatingService::submit`] performs, in order:
///
/// 1. persist the rating
/// 2. invalidate `AverageRating_{provider_id}`
/// 3. stage a [`PendingAggregationJob`] for the aggregation worker
/// 4. publish a [`RateCreatedEvent`] on the fan-out exchange
///
/// The steps are not transactional. A failure after step 1 leaves the rating
/// persisted but not (fully) propagated, and the caller sees the error.
pub struct RatingService {
    ratings: Arc<dyn RatingRepository>,
    cache: Arc<dyn CacheService>,
    staging: Arc<dyn StagingStore>,
    event_bus: Arc<dyn EventBus>,
    clock: Arc<dyn Clock>,
}

impl RatingService {
    pub fn new(
        ratings: Arc<dyn RatingRepository>,
        cache: Arc<dyn CacheService>,
        staging: Arc<dyn StagingStore>,
        event_bus: Arc<dyn EventBus>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            ratings,
            cache,
            staging,
            event_bus,
            clock,
        }
    }

    /// Validates, persists and propagates a rating.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if an id is not positive or the value is
    /// outside `1..=5`.
    /// Returns [`AppError::NotFound`] if the provider or user does not exist.
    /// Returns [`AppError::Unavailable`] if the staging store or event bus
    /// cannot be reached; the rating stays persisted in that case.
    pub async fn submit(&self, submission: RatingSubmission) -> Result<Rating, AppError> {
        let rating_value = submission.validate()?;

        let rating = self
            .ratings
            .create(NewRating {
                provider_id: submission.provider_id,
                user_id: submission.user_id,
                rating_value,
                created_at: self.clock.now(),
            })
            .await?;

        let cache_key = average_rating_key(rating.provider_id);
        if let Err(e) = self.cache.invalidate(&cache_key).await {
            warn!(key = %cache_key, error = %e, "Failed to invalidate cached average");
        }

        let job = PendingAggregationJob::from(&rating);
        let key = self.staging.stage(&job).await.map_err(|e| {
            error!(
                rating_id = rating.id,
                provider_id = rating.provider_id,
                error = %e,
                "Rating persisted but not staged for aggregation"
            );
            AppError::from(e)
        })?;
        debug!(key = %key, rating_id = rating.id, "Aggregation job staged");

        self.event_bus
            .publish(&RateCreatedEvent::from_rating(&rating))
            .await
            .map_err(|e| {
                error!(
                    rating_id = rating.id,
                    provider_id = rating.provider_id,
                    error = %e,
                    "Rating staged but event not published"
                );
                AppError::from(e)
            })?;

        metrics::counter!("ratings_submitted_total").increment(1);
        info!(
            rating_id = rating.id,
            provider_id = rating.provider_id,
            user_id = rating.user_id,
            rating_value = rating.rating_value,
            "Rating accepted"
        );

        Ok(rating)
    }
}
