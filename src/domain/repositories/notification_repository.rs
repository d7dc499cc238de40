//! Repository trait for notifications.

use crate::domain::entities::{NewNotification, Notification};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Repository interface for the notification feed.
///
/// # Idempotency
///
/// [`NotificationRepository::create_if_absent`] must treat
/// `(provider_id, user_id, created_at)` as a natural key so that a redelivered
/// event never produces a second row.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Inserts a notification unless an identical one already exists.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Notification))` if a row was created
    /// - `Ok(None)` if the notification was already recorded
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] or [`AppError::Unavailable`] on database errors.
    async fn create_if_absent(
        &self,
        new_notification: NewNotification,
    ) -> Result<Option<Notification>, AppError>;

    /// Lists notifications recorded in `(after, until]`, in recording order.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn list_recorded_between(
        &self,
        after: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<Notification>, AppError>;
}
