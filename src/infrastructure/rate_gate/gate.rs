//! Rate gate trait, key scheme and expiry computation.

use async_trait::async_trait;
use chrono::{DateTime, Days, NaiveDate, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RateGateError {
    #[error("Rate gate backend error: {0}")]
    Backend(String),
}

impl From<redis::RedisError> for RateGateError {
    fn from(e: redis::RedisError) -> Self {
        Self::Backend(e.to_string())
    }
}

pub type RateGateResult<T> = Result<T, RateGateError>;

/// Per-provider, per-UTC-day quota of aggregated ratings.
///
/// # Invariant
///
/// A day's counter receives its expiry (next UTC midnight) only when it is
/// created. Later increments never touch the expiry.
///
/// # Implementations
///
/// - [`crate::infrastructure::rate_gate::RedisRateGate`]
/// - [`crate::infrastructure::rate_gate::MemoryRateGate`]
#[async_trait]
pub trait RateGate: Send + Sync {
    /// Returns `true` once today's count for the provider reached the limit.
    async fn is_exceeded(&self, provider_id: i64) -> RateGateResult<bool>;

    /// Counts one more accepted rating for today. Returns the new count.
    async fn increment(&self, provider_id: i64) -> RateGateResult<i64>;
}

/// Counter key: `daily_rating_count:{provider_id}:{yyyyMMdd}`.
pub fn daily_key(provider_id: i64, date: NaiveDate) -> String {
    format!(
        "daily_rating_count:{}:{}",
        provider_id,
        date.format("%Y%m%d")
    )
}

/// The first instant of the UTC day after `now`.
pub fn next_utc_midnight(now: DateTime<Utc>) -> DateTime<Utc> {
    let tomorrow = now
        .date_naive()
        .checked_add_days(Days::new(1))
        .unwrap_or(NaiveDate::MAX);
    tomorrow.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc()
}
