//! PostgreSQL repository implementations.
//!
//! Concrete implementations of domain repository traits using SQLx runtime
//! queries mapped through `FromRow`.
//!
//! # Repositories
//!
//! - [`PgRatingRepository`] - Rating log
//! - [`PgProviderRepository`] - Providers with optimistic locking
//! - [`PgUserRepository`] - Users
//! - [`PgNotificationRepository`] - Idempotent notification feed

pub mod pg_notification_repository;
pub mod pg_provider_repository;
pub mod pg_rating_repository;
pub mod pg_user_repository;

pub use pg_notification_repository::PgNotificationRepository;
pub use pg_provider_repository::PgProviderRepository;
pub use pg_rating_repository::PgRatingRepository;
pub use pg_user_repository::PgUserRepository;
