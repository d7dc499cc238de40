//! Repository trait for service providers.

use crate::domain::entities::{NewProvider, Provider};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for providers and their aggregate state.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgProviderRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProviderRepository: Send + Sync {
    /// Lists all providers ordered by name.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn list(&self) -> Result<Vec<Provider>, AppError>;

    /// Finds a provider by id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_id(&self, id: i64) -> Result<Option<Provider>, AppError>;

    /// Checks whether a provider with this exact name exists.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn exists_by_name(&self, name: &str) -> Result<bool, AppError>;

    /// Creates a provider with an empty rating history.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the name is taken.
    async fn create(&self, new_provider: NewProvider) -> Result<Provider, AppError>;

    /// Writes `average_rating`, `rating_count` and `last_updated_date` if the
    /// stored `version` still equals `provider.version`, bumping it by one.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] when the row changed since it was read
    /// (or no longer exists).
    async fn update_rating(&self, provider: &Provider) -> Result<Provider, AppError>;

    /// Deletes a provider. Returns `Ok(false)` if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;
}
