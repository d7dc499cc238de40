//! DTOs for the notification feed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::Notification;

/// Query of `GET /api/notifications/new`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNotificationsQuery {
    pub user_id: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationItem {
    pub id: i64,
    pub provider_id: i64,
    pub user_id: i64,
    pub rating_value: i32,
    pub created_at: DateTime<Utc>,
    pub recorded_at: DateTime<Utc>,
}

impl From<Notification> for NotificationItem {
    fn from(n: Notification) -> Self {
        Self {
            id: n.id,
            provider_id: n.provider_id,
            user_id: n.user_id,
            rating_value: n.rating_value,
            created_at: n.created_at,
            recorded_at: n.recorded_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NotificationListResponse {
    pub items: Vec<NotificationItem>,
}
