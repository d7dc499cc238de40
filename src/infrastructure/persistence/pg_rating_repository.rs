//! PostgreSQL implementation of the rating repository.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{NewRating, Rating};
use crate::domain::repositories::RatingRepository;
use crate::error::AppError;

/// PostgreSQL repository for the append-only rating log.
pub struct PgRatingRepository {
    pool: Arc<PgPool>,
}

impl PgRatingRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RatingRepository for PgRatingRepository {
    async fn create(&self, new_rating: NewRating) -> Result<Rating, AppError> {
        let rating = sqlx::query_as::<_, Rating>(
            r#"
            INSERT INTO ratings (provider_id, user_id, rating_value, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, provider_id, user_id, rating_value, created_at
            "#,
        )
        .bind(new_rating.provider_id)
        .bind(new_rating.user_id)
        .bind(new_rating.rating_value.as_i32())
        .bind(new_rating.created_at)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(rating)
    }

    async fn count_by_provider(&self, provider_id: i64) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ratings WHERE provider_id = $1")
            .bind(provider_id)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }
}
