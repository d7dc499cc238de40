//! Repository trait definitions for the domain layer.
//!
//! These traits abstract the relational store. Concrete implementations live
//! in `crate::infrastructure::persistence`; mocks are generated via `mockall`
//! for unit tests.
//!
//! # Available Repositories
//!
//! - [`RatingRepository`] - Append-only rating log
//! - [`ProviderRepository`] - Providers and their running average
//! - [`UserRepository`] - Users and their feed cursor
//! - [`NotificationRepository`] - Idempotent notification feed
//!
//! # Testing
//!
//! See integration tests in `tests/repository_*.rs` for usage examples.

pub mod notification_repository;
pub mod provider_repository;
pub mod rating_repository;
pub mod user_repository;

pub use notification_repository::NotificationRepository;
pub use provider_repository::ProviderRepository;
pub use rating_repository::RatingRepository;
pub use user_repository::UserRepository;

#[cfg(test)]
pub use notification_repository::MockNotificationRepository;
#[cfg(test)]
pub use provider_repository::MockProviderRepository;
#[cfg(test)]
pub use rating_repository::MockRatingRepository;
#[cfg(test)]
pub use user_repository::MockUserRepository;
