//! API route configuration.

use crate::api::handlers::{
    average_rating_handler, create_provider_handler, create_user_handler,
    delete_provider_handler, delete_user_handler, get_provider_handler, get_user_handler,
    new_notifications_handler, provider_list_handler, submit_rating_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// All API routes.
///
/// # Endpoints
///
/// - `POST   /ratings`                        - Submit a rating (202)
/// - `GET    /providers`                      - List providers
/// - `POST   /providers`                      - Create a provider
/// - `GET    /providers/{id}`                 - Get a provider
/// - `DELETE /providers/{id}`                 - Delete a provider
/// - `GET    /providers/{id}/average-rating`  - Cached average rating
/// - `POST   /users`                          - Create a user
/// - `GET    /users/{id}`                     - Get a user
/// - `DELETE /users/{id}`                     - Delete a user
/// - `GET    /notifications/new?userId={id}`  - Notifications since the last fetch
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ratings", post(submit_rating_handler))
        .route(
            "/providers",
            get(provider_list_handler).post(create_provider_handler),
        )
        .route(
            "/providers/{id}",
            get(get_provider_handler).delete(delete_provider_handler),
        )
        .route(
            "/providers/{id}/average-rating",
            get(average_rating_handler),
        )
        .route("/users", post(create_user_handler))
        .route(
            "/users/{id}",
            get(get_user_handler).delete(delete_user_handler),
        )
        .route("/notifications/new", get(new_notifications_handler))
}
