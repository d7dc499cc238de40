//! Redis-backed staging store.

use async_trait::async_trait;
use redis::{AsyncCommands, aio::ConnectionManager};
use tracing::debug;

use super::store::{StagedEntry, StagingResult, StagingStore, decode_entry, new_job_key};
use crate::domain::aggregation_job::PendingAggregationJob;

/// Stores each job as a plain string key and tracks outstanding keys in a set.
///
/// Payload keys carry no TTL; a job lives until the worker acks it.
pub struct RedisStagingStore {
    conn: ConnectionManager,
    set_key: String,
}

impl RedisStagingStore {
    /// # Arguments
    ///
    /// - `conn` - shared connection manager
    /// - `set_key` - name of the outstanding-key set (`STAGING_SET_KEY`)
    pub fn new(conn: ConnectionManager, set_key: impl Into<String>) -> Self {
        Self {
            conn,
            set_key: set_key.into(),
        }
    }
}

#[async_trait]
impl StagingStore for RedisStagingStore {
    async fn stage(&self, job: &PendingAggregationJob) -> StagingResult<String> {
        let key = new_job_key();
        let payload = serde_json::to_string(job)?;
        let mut conn = self.conn.clone();

        // Payload before key: drain treats a key without payload as processed.
        conn.set::<_, _, ()>(&key, payload).await?;
        conn.sadd::<_, _, ()>(&self.set_key, &key).await?;

        debug!(key = %key, provider_id = job.provider_id, "Staged aggregation job");
        Ok(key)
    }

    async fn drain(&self) -> StagingResult<Vec<StagedEntry>> {
        let mut conn = self.conn.clone();
        let keys: Vec<String> = conn.smembers(&self.set_key).await?;

        let mut entries = Vec::with_capacity(keys.len());
        for key in keys {
            let payload: Option<String> = conn.get(&key).await?;
            match payload {
                Some(payload) => entries.push(decode_entry(key, &payload)),
                None => {
                    debug!(key = %key, "Staged payload missing, dropping key");
                    conn.srem::<_, _, ()>(&self.set_key, &key).await?;
                }
            }
        }

        Ok(entries)
    }

    async fn ack(&self, key: &str) -> StagingResult<()> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(key).await?;
        conn.srem::<_, _, ()>(&self.set_key, key).await?;
        Ok(())
    }

    async fn outstanding(&self) -> StagingResult<usize> {
        let mut conn = self.conn.clone();
        Ok(conn.scard(&self.set_key).await?)
    }
}
