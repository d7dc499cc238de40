//! Staging store for pending aggregation jobs.
//!
//! - [`StagingStore`] - Trait: stage / drain / ack
//! - [`RedisStagingStore`] - Redis string keys plus an outstanding-key set
//! - [`MemoryStagingStore`] - Process-local implementation

mod memory_store;
mod redis_store;
mod store;

pub use memory_store::MemoryStagingStore;
pub use redis_store::RedisStagingStore;
pub use store::{StagedEntry, StagingError, StagingResult, StagingStore};
