//! User entity.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// A user who submits ratings and reads the notification feed.
///
/// `last_fetch_time` marks the last time the user pulled new notifications.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub name: String,
    pub last_fetch_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Input data for creating a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
}
