//! DTOs for provider endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::entities::Provider;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProviderRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderItem {
    pub id: i64,
    pub name: String,
    pub average_rating: f64,
    pub rating_count: i64,
    pub created_at: DateTime<Utc>,
    pub last_updated_date: DateTime<Utc>,
}

impl From<Provider> for ProviderItem {
    fn from(p: Provider) -> Self {
        Self {
            id: p.id,
            name: p.name,
            average_rating: p.average_rating,
            rating_count: p.rating_count,
            created_at: p.created_at,
            last_updated_date: p.last_updated_date,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProviderListResponse {
    pub items: Vec<ProviderItem>,
}
