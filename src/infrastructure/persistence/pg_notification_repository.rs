//! PostgreSQL implementation of the notification repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{NewNotification, Notification};
use crate::domain::repositories::NotificationRepository;
use crate::error::AppError;

/// PostgreSQL repository for the notification feed.
///
/// Inserts rely on the `notifications_event_unique` constraint with
/// `ON CONFLICT DO NOTHING` for idempotency.
pub struct PgNotificationRepository {
    pool: Arc<PgPool>,
}

impl PgNotificationRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationRepository for PgNotificationRepository {
    async fn create_if_absent(
        &self,
        new_notification: NewNotification,
    ) -> Result<Option<Notification>, AppError> {
        let notification = sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (provider_id, user_id, rating_value, created_at, recorded_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT ON CONSTRAINT notifications_event_unique DO NOTHING
            RETURNING id, provider_id, user_id, rating_value, created_at, recorded_at
            "#,
        )
        .bind(new_notification.provider_id)
        .bind(new_notification.user_id)
        .bind(new_notification.rating_value)
        .bind(new_notification.created_at)
        .bind(new_notification.recorded_at)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(notification)
    }

    async fn list_recorded_between(
        &self,
        after: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<Notification>, AppError> {
        let notifications = sqlx::query_as::<_, Notification>(
            r#"
            SELECT id, provider_id, user_id, rating_value, created_at, recorded_at
            FROM notifications
            WHERE recorded_at > $1 AND recorded_at <= $2
            ORDER BY recorded_at, id
            "#,
        )
        .bind(after)
        .bind(until)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(notifications)
    }
}
