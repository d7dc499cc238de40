//! Process-local rate gate.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::gate::{RateGate, RateGateResult, daily_key, next_utc_midnight};
use crate::utils::Clock;

#[derive(Debug, Clone, Copy)]
struct Counter {
    count: i64,
    expires_at: DateTime<Utc>,
}

/// Rate gate with in-memory counters that expire like the Redis keys.
pub struct MemoryRateGate {
    counters: Mutex<HashMap<String, Counter>>,
    limit: i64,
    clock: Arc<dyn Clock>,
}

impl MemoryRateGate {
    pub fn new(limit: i64, clock: Arc<dyn Clock>) -> Self {
        Self {
            counters: Mutex::new(HashMap::new()),
            limit,
            clock,
        }
    }

    /// Expiry of today's counter for `provider_id`, if one is live.
    pub fn expiry_of(&self, provider_id: i64) -> Option<DateTime<Utc>> {
        self.live(provider_id).map(|c| c.expires_at)
    }

    /// Today's count for `provider_id`.
    pub fn count_of(&self, provider_id: i64) -> i64 {
        self.live(provider_id).map_or(0, |c| c.count)
    }

    fn live(&self, provider_id: i64) -> Option<Counter> {
        let now = self.clock.now();
        let key = daily_key(provider_id, now.date_naive());
        let counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());
        counters.get(&key).filter(|c| c.expires_at > now).copied()
    }
}

#[async_trait]
impl RateGate for MemoryRateGate {
    async fn is_exceeded(&self, provider_id: i64) -> RateGateResult<bool> {
        Ok(self.count_of(provider_id) >= self.limit)
    }

    async fn increment(&self, provider_id: i64) -> RateGateResult<i64> {
        let now = self.clock.now();
        let key = daily_key(provider_id, now.date_naive());
        let mut counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());

        let counter = counters
            .entry(key)
            .and_modify(|c| {
                if c.expires_at <= now {
                    *c = Counter {
                        count: 0,
                        expires_at: next_utc_midnight(now),
                    };
                }
            })
            .or_insert_with(|| Counter {
                count: 0,
                expires_at: next_utc_midnight(now),
            });
        counter.count += 1;

        Ok(counter.count)
    }
}
