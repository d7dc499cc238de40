//! Business logic services for the application layer.

pub mod notification_service;
pub mod provider_service;
pub mod rating_service;
pub mod user_service;

pub use notification_service::{NotificationService, RecordOutcome};
pub use provider_service::{AverageRating, ProviderService};
pub use rating_service::RatingService;
pub use user_service::UserService;
