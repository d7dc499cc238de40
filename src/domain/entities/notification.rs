//! Persisted notification created from a rating event.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::domain::events::RateCreatedEvent;

/// Recipient-facing notification record.
///
/// `created_at` is the rating's timestamp and, with `provider_id` and
/// `user_id`, identifies the event: writing the same event twice yields one
/// row. `recorded_at` is when the row was stored and drives the feed cursor.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: i64,
    pub provider_id: i64,
    pub user_id: i64,
    pub rating_value: i32,
    pub created_at: DateTime<Utc>,
    pub recorded_at: DateTime<Utc>,
}

/// Input data for recording a notification.
#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    pub provider_id: i64,
    pub user_id: i64,
    pub rating_value: i32,
    pub created_at: DateTime<Utc>,
    pub recorded_at: DateTime<Utc>,
}

impl NewNotification {
    pub fn from_event(event: &RateCreatedEvent, recorded_at: DateTime<Utc>) -> Self {
        Self {
            provider_id: event.provider_id,
            user_id: event.user_id,
            rating_value: event.rating_value,
            created_at: event.created_at,
            recorded_at,
        }
    }
}
