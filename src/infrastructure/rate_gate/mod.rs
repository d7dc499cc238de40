//! Daily per-provider rating quota.
//!
//! - [`RateGate`] - Trait: is_exceeded / increment
//! - [`RedisRateGate`] - Redis counters expiring at the next UTC midnight
//! - [`MemoryRateGate`] - Process-local counters

mod gate;
mod memory_gate;
mod redis_gate;

pub use gate::{RateGate, RateGateError, RateGateResult, daily_key, next_utc_midnight};
pub use memory_gate::MemoryRateGate;
pub use redis_gate::RedisRateGate;
