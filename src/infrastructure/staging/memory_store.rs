//! Process-local staging store.

use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;

use super::store::{StagedEntry, StagingResult, StagingStore, decode_entry, new_job_key};
use crate::domain::aggregation_job::PendingAggregationJob;

#[derive(Debug, Default)]
struct Inner {
    payloads: HashMap<String, String>,
    outstanding: BTreeSet<String>,
}

/// Staging store kept in memory, with the same semantics as the Redis one.
#[derive(Debug, Default)]
pub struct MemoryStagingStore {
    inner: Mutex<Inner>,
}

impl MemoryStagingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages an arbitrary payload under `key`, bypassing serialization.
    pub fn stage_raw(&self, key: &str, payload: &str) {
        let mut inner = self.lock();
        inner.payloads.insert(key.to_string(), payload.to_string());
        inner.outstanding.insert(key.to_string());
    }

    /// Removes only the payload, leaving the key outstanding.
    pub fn expire_payload(&self, key: &str) {
        self.lock().payloads.remove(key);
    }

    pub fn contains_payload(&self, key: &str) -> bool {
        self.lock().payloads.contains_key(key)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl StagingStore for MemoryStagingStore {
    async fn stage(&self, job: &PendingAggregationJob) -> StagingResult<String> {
        let key = new_job_key();
        let payload = serde_json::to_string(job)?;
        self.stage_raw(&key, &payload);
        Ok(key)
    }

    async fn drain(&self) -> StagingResult<Vec<StagedEntry>> {
        let mut inner = self.lock();
        let keys: Vec<String> = inner.outstanding.iter().cloned().collect();

        let mut entries = Vec::with_capacity(keys.len());
        for key in keys {
            match inner.payloads.get(&key) {
                Some(payload) => entries.push(decode_entry(key, payload)),
                None => {
                    inner.outstanding.remove(&key);
                }
            }
        }

        Ok(entries)
    }

    async fn ack(&self, key: &str) -> StagingResult<()> {
        let mut inner = self.lock();
        inner.payloads.remove(key);
        inner.outstanding.remove(key);
        Ok(())
    }

    async fn outstanding(&self) -> StagingResult<usize> {
        Ok(self.lock().outstanding.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stage_then_drain() {
        let store = MemoryStagingStore::new();
        let key = store
            .stage(&PendingAggregationJob::new(1, 2, 5))
            .await
            .unwrap();

        let entries = store.drain().await.unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(
            entries[0],
            StagedEntry::Job {
                key,
                job: PendingAggregationJob::new(1, 2, 5)
            }
        );
    }

    #[tokio::test]
    async fn test_drain_does_not_consume() {
        let store = MemoryStagingStore::new();
        store
            .stage(&PendingAggregationJob::new(1, 2, 5))
            .await
            .unwrap();

        assert_eq!(store.drain().await.unwrap().len(), 1);
        assert_eq!(store.drain().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_ack_is_idempotent() {
        let store = MemoryStagingStore::new();
        let key = store
            .stage(&PendingAggregationJob::new(1, 2, 5))
            .await
            .unwrap();

        store.ack(&key).await.unwrap();
        store.ack(&key).await.unwrap();
        store.ack("never-staged").await.unwrap();

        assert_eq!(store.outstanding().await.unwrap(), 0);
        assert!(store.drain().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_payload_is_skipped() {
        let store = MemoryStagingStore::new();
        let key = store
            .stage(&PendingAggregationJob::new(1, 2, 5))
            .await
            .unwrap();
        store.expire_payload(&key);

        assert!(store.drain().await.unwrap().is_empty());
        assert_eq!(store.outstanding().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_malformed_payload_is_reported() {
        let store = MemoryStagingStore::new();
        store.stage_raw("rating_message_bad", "{broken");

        let entries = store.drain().await.unwrap();

        assert_eq!(entries.len(), 1);
        assert!(matches!(entries[0], StagedEntry::Malformed { .. }));
    }
}
