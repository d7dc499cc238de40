//! PostgreSQL implementation of the provider repository.

use async_trait::async_trait;
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{NewProvider, Provider};
use crate::domain::repositories::ProviderRepository;
use crate::error::AppError;

const PROVIDER_COLUMNS: &str =
    "id, name, average_rating, rating_count, created_at, last_updated_date, version";

/// PostgreSQL repository for providers.
///
/// Rating updates use the `version` column as an optimistic lock.
pub struct PgProviderRepository {
    pool: Arc<PgPool>,
}

impl PgProviderRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProviderRepository for PgProviderRepository {
    async fn list(&self) -> Result<Vec<Provider>, AppError> {
        let providers = sqlx::query_as::<_, Provider>(&format!(
            "SELECT {PROVIDER_COLUMNS} FROM providers ORDER BY name"
        ))
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(providers)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Provider>, AppError> {
        let provider = sqlx::query_as::<_, Provider>(&format!(
            "SELECT {PROVIDER_COLUMNS} FROM providers WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(provider)
    }

    async fn exists_by_name(&self, name: &str) -> Result<bool, AppError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM providers WHERE name = $1)")
                .bind(name)
                .fetch_one(self.pool.as_ref())
                .await?;

        Ok(exists)
    }

    async fn create(&self, new_provider: NewProvider) -> Result<Provider, AppError> {
        let provider = sqlx::query_as::<_, Provider>(&format!(
            "INSERT INTO providers (name) VALUES ($1) RETURNING {PROVIDER_COLUMNS}"
        ))
        .bind(&new_provider.name)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(provider)
    }

    async fn update_rating(&self, provider: &Provider) -> Result<Provider, AppError> {
        let updated = sqlx::query_as::<_, Provider>(&format!(
            r#"
            UPDATE providers
            SET average_rating = $3,
                rating_count = $4,
                last_updated_date = $5,
                version = version + 1
            WHERE id = $1 AND version = $2
            RETURNING {PROVIDER_COLUMNS}
            "#
        ))
        .bind(provider.id)
        .bind(provider.version)
        .bind(provider.average_rating)
        .bind(provider.rating_count)
        .bind(provider.last_updated_date)
        .fetch_optional(self.pool.as_ref())
        .await?;

        updated.ok_or_else(|| {
            AppError::conflict(
                "Provider was modified concurrently",
                json!({ "provider_id": provider.id, "version": provider.version }),
            )
        })
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM providers WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
