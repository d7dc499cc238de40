//! Service provider aggregate and its running average.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use super::rating::RatingValue;

/// A rated service provider.
///
/// `average_rating` is the arithmetic mean of the `rating_count` ratings the
/// aggregation worker accepted. `version` is the optimistic concurrency token,
/// bumped by every successful update.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Provider {
    pub id: i64,
    pub name: String,
    pub average_rating: f64,
    pub rating_count: i64,
    pub created_at: DateTime<Utc>,
    pub last_updated_date: DateTime<Utc>,
    #[serde(skip)]
    pub version: i64,
}

impl Provider {
    /// Folds one more rating into the running average.
    ///
    /// Leaves `version` untouched; the repository compares it on write.
    pub fn apply_rating(&mut self, value: RatingValue, now: DateTime<Utc>) {
        let count = self.rating_count as f64;
        self.average_rating = (self.average_rating * count + value.as_f64()) / (count + 1.0);
        self.rating_count += 1;
        self.last_updated_date = now;
    }
}

/// Input data for creating a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProvider {
    pub name: String,
}
