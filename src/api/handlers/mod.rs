//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod health;
pub mod notifications;
pub mod providers;
pub mod ratings;
pub mod users;

pub use health::health_handler;
pub use notifications::new_notifications_handler;
pub use providers::{
    average_rating_handler, create_provider_handler, delete_provider_handler,
    get_provider_handler, provider_list_handler,
};
pub use ratings::submit_rating_handler;
pub use users::{create_user_handler, delete_user_handler, get_user_handler};
