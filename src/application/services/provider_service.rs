//! Provider management and the cached average-rating read.

use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::domain::entities::{NewProvider, Provider};
use crate::domain::repositories::ProviderRepository;
use crate::error::AppError;
use crate::infrastructure::cache::{CacheService, average_rating_key};

/// Result of [`ProviderService::average_rating`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AverageRating {
    pub provider_id: i64,
    pub average_rating: f64,
    /// `true` when the value came from the cache.
    pub cached: bool,
}

/// Service for providers.
///
/// Providers are created here with an empty average. Their average is only
/// ever changed by the aggregation worker.
pub struct ProviderService {
    repository: Arc<dyn ProviderRepository>,
    cache: Arc<dyn CacheService>,
    average_ttl_seconds: u64,
}

impl ProviderService {
    pub fn new(
        repository: Arc<dyn ProviderRepository>,
        cache: Arc<dyn CacheService>,
        average_ttl_seconds: u64,
    ) -> Self {
        Self {
            repository,
            cache,
            average_ttl_seconds,
        }
    }

    pub async fn list_providers(&self) -> Result<Vec<Provider>, AppError> {
        self.repository.list().await
    }

    /// Retrieves a provider by id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the provider does not exist.
    pub async fn get_provider(&self, id: i64) -> Result<Provider, AppError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Provider not found", json!({ "id": id })))
    }

    /// Creates a provider with average 0 and count 0.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the trimmed name is empty.
    /// Returns [`AppError::Conflict`] if a provider with that name exists.
    pub async fn create_provider(&self, name: String) -> Result<Provider, AppError> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::bad_request(
                "Provider name must not be empty",
                json!({ "field": "name" }),
            ));
        }

        if self.repository.exists_by_name(&name).await? {
            return Err(AppError::conflict(
                "Provider already exists",
                json!({ "name": name }),
            ));
        }

        self.repository.create(NewProvider { name }).await
    }

    /// Deletes a provider together with its ratings.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the provider does not exist.
    pub async fn delete_provider(&self, id: i64) -> Result<(), AppError> {
        if !self.repository.delete(id).await? {
            return Err(AppError::not_found(
                "Provider not found",
                json!({ "id": id }),
            ));
        }

        if let Err(e) = self.cache.invalidate(&average_rating_key(id)).await {
            warn!(provider_id = id, error = %e, "Failed to invalidate cached average");
        }
        Ok(())
    }

    /// Reads a provider's average through the `AverageRating_{id}` cache entry.
    ///
    /// # Cache Strategy
    ///
    /// - **Cache hit**: Return the cached value
    /// - **Cache miss**: Read the provider, cache its average with the configured TTL
    /// - **Cache error**: Log and fall back to the database
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the provider does not exist.
    pub async fn average_rating(&self, id: i64) -> Result<AverageRating, AppError> {
        let key = average_rating_key(id);

        match self.cache.get(&key).await {
            Ok(Some(raw)) => match raw.parse::<f64>() {
                Ok(average_rating) => {
                    debug!(key = %key, "Cache HIT");
                    return Ok(AverageRating {
                        provider_id: id,
                        average_rating,
                        cached: true,
                    });
                }
                Err(e) => warn!(key = %key, error = %e, "Ignoring unparsable cached average"),
            },
            Ok(None) => debug!(key = %key, "Cache MISS"),
            Err(e) => error!(key = %key, error = %e, "Cache error"),
        }

        let provider = self.get_provider(id).await?;

        if let Err(e) = self
            .cache
            .set(
                &key,
                &provider.average_rating.to_string(),
                Some(self.average_ttl_seconds),
            )
            .await
        {
            error!(key = %key, error = %e, "Failed to cache average");
        }

        Ok(AverageRating {
            provider_id: id,
            average_rating: provider.average_rating,
            cached: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockProviderRepository;
    use crate::infrastructure::cache::MemoryCache;
    use chrono::Utc;
    use mockall::predicate::eq;

    fn provider(id: i64, average_rating: f64) -> Provider {
        Provider {
            id,
            name: "Acme Plumbing".to_string(),
            average_rating,
            rating_count: 2,
            created_at: Utc::now(),
            last_updated_date: Utc::now(),
            version: 2,
        }
    }

    #[tokio::test]
    async fn test_average_rating_reads_through_cache() {
        let mut repo = MockProviderRepository::new();
        repo.expect_find_by_id()
            .with(eq(7))
            .times(1)
            .returning(|id| Ok(Some(provider(id, 3.5))));
        let cache = Arc::new(MemoryCache::new());
        let service = ProviderService::new(Arc::new(repo), cache.clone(), 60);

        let first = service.average_rating(7).await.unwrap();
        let second = service.average_rating(7).await.unwrap();

        assert_eq!(first.average_rating, 3.5);
        assert!(!first.cached);
        assert_eq!(second.average_rating, 3.5);
        assert!(second.cached);
        assert!(cache.contains("AverageRating_7"));
    }

    #[tokio::test]
    async fn test_average_rating_unknown_provider() {
        let mut repo = MockProviderRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(None));
        let service = ProviderService::new(Arc::new(repo), Arc::new(MemoryCache::new()), 60);

        let result = service.average_rating(404).await;

        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_create_provider_rejects_duplicate_name() {
        let mut repo = MockProviderRepository::new();
        repo.expect_exists_by_name()
            .withf(|name| name == "Acme Plumbing")
            .returning(|_| Ok(true));
        repo.expect_create().times(0);
        let service = ProviderService::new(Arc::new(repo), Arc::new(MemoryCache::new()), 60);

        let result = service.create_provider("  Acme Plumbing ".to_string()).await;

        assert!(matches!(result, Err(AppError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_create_provider_rejects_blank_name() {
        let mut repo = MockProviderRepository::new();
        repo.expect_exists_by_name().times(0);
        let service = ProviderService::new(Arc::new(repo), Arc::new(MemoryCache::new()), 60);

        let result = service.create_provider("   ".to_string()).await;

        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_delete_missing_provider() {
        let mut repo = MockProviderRepository::new();
        repo.expect_delete().returning(|_| Ok(false));
        let service = ProviderService::new(Arc::new(repo), Arc::new(MemoryCache::new()), 60);

        assert!(matches!(
            service.delete_provider(9).await,
            Err(AppError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_provider_drops_cached_average() {
        let mut repo = MockProviderRepository::new();
        repo.expect_delete().returning(|_| Ok(true));
        let cache = Arc::new(MemoryCache::new());
        cache.set("AverageRating_9", "4", None).await.unwrap();
        let service = ProviderService::new(Arc::new(repo), cache.clone(), 60);

        service.delete_provider(9).await.unwrap();

        assert!(!cache.contains("AverageRating_9"));
    }
}
