//! Redis-backed rate gate.

use async_trait::async_trait;
use redis::{AsyncCommands, aio::ConnectionManager};
use std::sync::Arc;
use tracing::debug;

use super::gate::{RateGate, RateGateResult, daily_key, next_utc_midnight};
use crate::utils::Clock;

/// Daily counters stored as Redis integers.
///
/// `increment` runs `SET key 0 NX EXAT <midnight>` followed by `INCR key` in
/// one `MULTI`/`EXEC`. `NX` makes the expiry apply only to a freshly created
/// counter and `INCR` keeps the existing TTL.
pub struct RedisRateGate {
    conn: ConnectionManager,
    limit: i64,
    clock: Arc<dyn Clock>,
}

impl RedisRateGate {
    pub fn new(conn: ConnectionManager, limit: i64, clock: Arc<dyn Clock>) -> Self {
        Self { conn, limit, clock }
    }
}

#[async_trait]
impl RateGate for RedisRateGate {
    async fn is_exceeded(&self, provider_id: i64) -> RateGateResult<bool> {
        let key = daily_key(provider_id, self.clock.now().date_naive());
        let mut conn = self.conn.clone();

        let count: Option<i64> = conn.get(&key).await?;
        Ok(count.is_some_and(|c| c >= self.limit))
    }

    async fn increment(&self, provider_id: i64) -> RateGateResult<i64> {
        let now = self.clock.now();
        let key = daily_key(provider_id, now.date_naive());
        let expire_at = next_utc_midnight(now).timestamp();
        let mut conn = self.conn.clone();

        let (count,): (i64,) = redis::pipe()
            .atomic()
            .cmd("SET")
            .arg(&key)
            .arg(0)
            .arg("NX")
            .arg("EXAT")
            .arg(expire_at)
            .ignore()
            .cmd("INCR")
            .arg(&key)
            .query_async(&mut conn)
            .await?;

        debug!(provider_id, count, key = %key, "Daily rating counter incremented");
        Ok(count)
    }
}
