//! Staging store trait and error types.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::aggregation_job::PendingAggregationJob;

#[derive(Debug, Error)]
pub enum StagingError {
    #[error("Staging store connection error: {0}")]
    Connection(String),
    #[error("Staging store operation error: {0}")]
    Operation(String),
    #[error("Failed to serialize staged job: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<redis::RedisError> for StagingError {
    fn from(e: redis::RedisError) -> Self {
        if e.is_io_error() || e.is_connection_dropped() || e.is_connection_refusal() {
            Self::Connection(e.to_string())
        } else {
            Self::Operation(e.to_string())
        }
    }
}

pub type StagingResult<T> = Result<T, StagingError>;

/// One outstanding key read during [`StagingStore::drain`].
#[derive(Debug, Clone, PartialEq)]
pub enum StagedEntry {
    /// A well-formed job.
    Job {
        key: String,
        job: PendingAggregationJob,
    },
    /// The payload exists but does not decode. The worker discards it.
    Malformed { key: String, reason: String },
}

impl StagedEntry {
    pub fn key(&self) -> &str {
        match self {
            Self::Job { key, .. } | Self::Malformed { key, .. } => key,
        }
    }
}

/// Durable bridge between synchronous intake and the aggregation worker.
///
/// A payload store plus one named set of outstanding keys. Neither
/// [`StagingStore::stage`] nor [`StagingStore::ack`] is atomic across its two
/// sub-operations.
///
/// # Implementations
///
/// - [`crate::infrastructure::staging::RedisStagingStore`] - `SET`/`SADD` on Redis
/// - [`crate::infrastructure::staging::MemoryStagingStore`] - Process-local maps
#[async_trait]
pub trait StagingStore: Send + Sync {
    /// Writes the payload under a fresh unique key, then adds the key to the
    /// outstanding set. Returns the key.
    async fn stage(&self, job: &PendingAggregationJob) -> StagingResult<String>;

    /// Snapshots the outstanding set and fetches each payload.
    ///
    /// Keys whose payload is gone are treated as already processed: they are
    /// skipped and dropped from the set. Iteration order is unspecified.
    async fn drain(&self) -> StagingResult<Vec<StagedEntry>>;

    /// Removes the payload and the outstanding key. Idempotent.
    async fn ack(&self, key: &str) -> StagingResult<()>;

    /// Number of outstanding keys, for health reporting.
    async fn outstanding(&self) -> StagingResult<usize>;
}

/// Decodes a raw payload into a drain entry.
pub(crate) fn decode_entry(key: String, payload: &str) -> StagedEntry {
    match serde_json::from_str::<PendingAggregationJob>(payload) {
        Ok(job) => StagedEntry::Job { key, job },
        Err(e) => StagedEntry::Malformed {
            key,
            reason: e.to_string(),
        },
    }
}

/// Generates a staging key: `rating_message_{uuid}`.
pub(crate) fn new_job_key() -> String {
    format!("rating_message_{}", uuid::Uuid::new_v4())
}
