//! Rating entity, rating value and the inbound submission.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::FromRow;

use crate::error::AppError;

/// One of the five accepted star values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RatingValue {
    One = 1,
    Two = 2,
    Three = 3,
    Four = 4,
    Five = 5,
}

impl RatingValue {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.as_i32())
    }
}

impl TryFrom<i32> for RatingValue {
    type Error = AppError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            3 => Ok(Self::Three),
            4 => Ok(Self::Four),
            5 => Ok(Self::Five),
            other => Err(AppError::bad_request(
                "Rating value must be between 1 and 5",
                json!({ "rating_value": other }),
            )),
        }
    }
}

/// A rating as submitted by a client, before validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingSubmission {
    pub provider_id: i64,
    pub user_id: i64,
    pub rating_value: i32,
}

impl RatingSubmission {
    pub fn new(provider_id: i64, user_id: i64, rating_value: i32) -> Self {
        Self {
            provider_id,
            user_id,
            rating_value,
        }
    }

    /// Checks identifiers and the rating range.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if either id is not positive or the
    /// value is outside `1..=5`.
    pub fn validate(&self) -> Result<RatingValue, AppError> {
        if self.provider_id <= 0 {
            return Err(AppError::bad_request(
                "Provider id must be greater than zero",
                json!({ "provider_id": self.provider_id }),
            ));
        }
        if self.user_id <= 0 {
            return Err(AppError::bad_request(
                "User id must be greater than zero",
                json!({ "user_id": self.user_id }),
            ));
        }

        RatingValue::try_from(self.rating_value)
    }
}

/// Immutable persisted rating row.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    pub id: i64,
    pub provider_id: i64,
    pub user_id: i64,
    pub rating_value: i32,
    pub created_at: DateTime<Utc>,
}

/// Input data for persisting a validated rating.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRating {
    pub provider_id: i64,
    pub user_id: i64,
    pub rating_value: RatingValue,
    pub created_at: DateTime<Utc>,
}
