//! Handler for the notification feed.

use axum::{
    Json,
    extract::{Query, State},
};

use crate::api::dto::notification::{
    NewNotificationsQuery, NotificationItem, NotificationListResponse,
};
use crate::error::AppError;
use crate::state::AppState;

/// Returns notifications created since the user's previous fetch.
///
/// # Endpoint
///
/// `GET /api/notifications/new?userId={id}`
///
/// Each call moves the user's fetch cursor to now, so a notification is
/// returned to a given user at most once.
///
/// # Errors
///
/// Returns 400 if `userId` is missing or not positive.
/// Returns 404 if the user does not exist.
pub async fn new_notifications_handler(
    Query(query): Query<NewNotificationsQuery>,
    State(state): State<AppState>,
) -> Result<Json<NotificationListResponse>, AppError> {
    let notifications = state
        .notification_service
        .new_for_user(query.user_id)
        .await?;

    Ok(Json(NotificationListResponse {
        items: notifications
            .into_iter()
            .map(NotificationItem::from)
            .collect(),
    }))
}
