//! Handlers for provider endpoints.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::provider::{CreateProviderRequest, ProviderItem, ProviderListResponse};
use crate::application::services::AverageRating;
use crate::error::AppError;
use crate::state::AppState;

/// `GET /api/providers`
pub async fn provider_list_handler(
    State(state): State<AppState>,
) -> Result<Json<ProviderListResponse>, AppError> {
    let providers = state.provider_service.list_providers().await?;

    Ok(Json(ProviderListResponse {
        items: providers.into_iter().map(ProviderItem::from).collect(),
    }))
}

/// `GET /api/providers/{id}`
///
/// # Errors
///
/// Returns 404 if the provider does not exist.
pub async fn get_provider_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<ProviderItem>, AppError> {
    let provider = state.provider_service.get_provider(id).await?;
    Ok(Json(provider.into()))
}

/// Creates a provider with an empty average.
///
/// # Endpoint
///
/// `POST /api/providers`
///
/// # Errors
///
/// Returns 400 if the name is empty or too long.
/// Returns 409 if a provider with that name exists.
pub async fn create_provider_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreateProviderRequest>,
) -> Result<(StatusCode, Json<ProviderItem>), AppError> {
    payload.validate()?;

    let provider = state.provider_service.create_provider(payload.name).await?;

    Ok((StatusCode::CREATED, Json(provider.into())))
}

/// Deletes a provider and its ratings.
///
/// # Endpoint
///
/// `DELETE /api/providers/{id}`
///
/// Staged jobs for the provider are dropped by the aggregation worker;
/// notifications already recorded stay.
///
/// # Errors
///
/// Returns 404 if the provider does not exist.
pub async fn delete_provider_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    state.provider_service.delete_provider(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Returns the provider's average rating, served from cache when possible.
///
/// # Endpoint
///
/// `GET /api/providers/{id}/average-rating`
///
/// # Response
///
/// ```json
/// { "providerId": 1, "averageRating": 4.25, "cached": true }
/// ```
///
/// # Errors
///
/// Returns 404 if the provider does not exist.
pub async fn average_rating_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<AverageRating>, AppError> {
    let average = state.provider_service.average_rating(id).await?;
    Ok(Json(average))
}
