//! Notification feed service.

use chrono::{DateTime, Utc};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info};

use crate::domain::entities::{NewNotification, Notification};
use crate::domain::events::RateCreatedEvent;
use crate::domain::repositories::{NotificationRepository, UserRepository};
use crate::error::AppError;
use crate::utils::Clock;

/// Outcome of [`NotificationService::record`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecordOutcome {
    Created(Notification),
    /// The event had already been recorded by an earlier delivery.
    Duplicate,
}

/// Writes notifications from rating events and serves the per-user feed.
pub struct NotificationService {
    notifications: Arc<dyn NotificationRepository>,
    users: Arc<dyn UserRepository>,
    clock: Arc<dyn Clock>,
}

impl NotificationService {
    pub fn new(
        notifications: Arc<dyn NotificationRepository>,
        users: Arc<dyn UserRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            notifications,
            users,
            clock,
        }
    }

    /// Persists the notification for `event`. Safe to call again for the same event.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] or [`AppError::Unavailable`] on database errors.
    pub async fn record(&self, event: &RateCreatedEvent) -> Result<RecordOutcome, AppError> {
        match self
            .notifications
            .create_if_absent(NewNotification::from_event(event, self.clock.now()))
            .await?
        {
            Some(notification) => {
                info!(
                    notification_id = notification.id,
                    provider_id = notification.provider_id,
                    user_id = notification.user_id,
                    "Notification created"
                );
                Ok(RecordOutcome::Created(notification))
            }
            None => {
                debug!(
                    provider_id = event.provider_id,
                    user_id = event.user_id,
                    created_at = %event.created_at,
                    "Notification already recorded"
                );
                Ok(RecordOutcome::Duplicate)
            }
        }
    }

    /// Returns notifications recorded since the user's last fetch and moves
    /// their fetch cursor to now.
    ///
    /// A user who never fetched gets the whole feed.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if `user_id` is not positive.
    /// Returns [`AppError::NotFound`] if the user does not exist.
    pub async fn new_for_user(&self, user_id: i64) -> Result<Vec<Notification>, AppError> {
        if user_id <= 0 {
            return Err(AppError::bad_request(
                "userId must be positive",
                json!({ "userId": user_id }),
            ));
        }

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found", json!({ "id": user_id })))?;

        let since = user.last_fetch_time.unwrap_or(DateTime::<Utc>::MIN_UTC);
        let now = self.clock.now();
        let notifications = self
            .notifications
            .list_recorded_between(since, now)
            .await?;

        self.users.set_last_fetch_time(user_id, now).await?;

        debug!(
            user_id,
            count = notifications.len(),
            since = %since,
            "Fetched new notifications"
        );
        Ok(notifications)
    }
}
