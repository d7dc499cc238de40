//! Application layer services implementing business logic.
//!
//! Services coordinate repository calls, validation and the infrastructure
//! capabilities (cache, staging store, event bus). HTTP handlers and the
//! background workers consume them.
//!
//! # Available Services
//!
//! - [`services::rating_service::RatingService`] - Rating intake
//! - [`services::provider_service::ProviderService`] - Providers and cached averages
//! - [`services::user_service::UserService`] - Users
//! - [`services::notification_service::NotificationService`] - Notification feed

pub mod services;
