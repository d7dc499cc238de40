//! Repository trait for persisted ratings.

use crate::domain::entities::{NewRating, Rating};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for the immutable rating log.
///
/// Ratings are inserted once by rating intake and never updated or deleted
/// by the pipeline.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgRatingRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RatingRepository: Send + Sync {
    /// Persists a new rating.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the provider or user row does not exist.
    /// Returns [`AppError::Internal`] on database errors.
    async fn create(&self, new_rating: NewRating) -> Result<Rating, AppError>;

    /// Counts every rating ever submitted for a provider, aggregated or not.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn count_by_provider(&self, provider_id: i64) -> Result<i64, AppError>;
}
