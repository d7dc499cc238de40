//! Core domain entities.
//!
//! Entities hold plain foreign-key fields (`provider_id`, `user_id`) instead of
//! object references; related rows are fetched through the repositories.
//!
//! # Entity Types
//!
//! - [`Rating`] - An immutable submitted rating
//! - [`Provider`] - A rated service provider with its running average
//! - [`User`] - A rating author and notification reader
//! - [`Notification`] - A feed entry derived from a rating event
//!
//! Each entity has a `New*` counterpart used for inserts.

pub mod notification;
pub mod provider;
pub mod rating;
pub mod user;

pub use notification::{NewNotification, Notification};
pub use provider::{NewProvider, Provider};
pub use rating::{NewRating, Rating, RatingSubmission, RatingValue};
pub use user::{NewUser, User};
