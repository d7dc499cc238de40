//! Aggregation worker: drains staged jobs into provider averages.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio_retry::RetryIf;
use tokio_retry::strategy::ExponentialBackoff;
use tracing::{debug, error, info, warn};

use crate::domain::aggregation_job::PendingAggregationJob;
use crate::domain::entities::{Provider, RatingValue};
use crate::domain::repositories::ProviderRepository;
use crate::error::AppError;
use crate::infrastructure::cache::{CacheService, average_rating_key};
use crate::infrastructure::rate_gate::RateGate;
use crate::infrastructure::staging::{StagedEntry, StagingError, StagingStore};
use crate::utils::Clock;

/// Retries after a version conflict on the provider row.
const CONFLICT_RETRIES: usize = 3;
const MAX_RETRY_DELAY: Duration = Duration::from_millis(200);

/// What happened to one staged job. Every outcome acks the job.
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    Aggregated(Provider),
    /// The provider's daily quota was already used up.
    RateLimited,
    ProviderMissing,
    /// The payload did not decode or carried an impossible rating value.
    Discarded,
}

/// Counters for one drain cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleSummary {
    pub aggregated: usize,
    pub rate_limited: usize,
    pub provider_missing: usize,
    pub malformed: usize,
    /// Jobs left staged after an infrastructure error.
    pub failed: usize,
}

impl CycleSummary {
    pub fn processed(&self) -> usize {
        self.aggregated + self.rate_limited + self.provider_missing + self.malformed
    }

    pub fn is_empty(&self) -> bool {
        self.processed() + self.failed == 0
    }

    fn record(&mut self, outcome: &JobOutcome) {
        match outcome {
            JobOutcome::Aggregated(_) => self.aggregated += 1,
            JobOutcome::RateLimited => self.rate_limited += 1,
            JobOutcome::ProviderMissing => self.provider_missing += 1,
            JobOutcome::Discarded => self.malformed += 1,
        }
    }
}

/// Polling loop that folds staged ratings into each provider's running average.
///
/// # Processing Flow
///
/// For every drained job:
///
/// 1. Consult the [`RateGate`]; an exhausted quota drops the job
/// 2. Read the provider and fold the rating into its average
/// 3. Write the provider back guarded by its `version`; re-read and retry on conflict
/// 4. Evict the provider's cached average
/// 5. Count the rating against the quota
/// 6. Ack the job
///
/// Jobs that hit an infrastructure error stay staged and are picked up again
/// by the next cycle.
pub struct AggregationWorker {
    staging: Arc<dyn StagingStore>,
    rate_gate: Arc<dyn RateGate>,
    providers: Arc<dyn ProviderRepository>,
    cache: Arc<dyn CacheService>,
    clock: Arc<dyn Clock>,
    poll_interval: Duration,
}

impl AggregationWorker {
    pub fn new(
        staging: Arc<dyn StagingStore>,
        rate_gate: Arc<dyn RateGate>,
        providers: Arc<dyn ProviderRepository>,
        cache: Arc<dyn CacheService>,
        clock: Arc<dyn Clock>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            staging,
            rate_gate,
            providers,
            cache,
            clock,
            poll_interval,
        }
    }

    /// Runs drain cycles every `poll_interval` until `shutdown` turns `true`
    /// or its sender is dropped. A cycle in progress always completes.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(
            poll_interval_ms = self.poll_interval.as_millis() as u64,
            "Aggregation worker started"
        );

        while !*shutdown.borrow() {
            match self.run_cycle().await {
                Ok(summary) if !summary.is_empty() => debug!(?summary, "Drain cycle finished"),
                Ok(_) => {}
                Err(e) => error!(error = %e, "Failed to drain staging store"),
            }

            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        info!("Aggregation worker stopped");
    }

    /// Drains the staging store once and processes every entry.
    ///
    /// # Errors
    ///
    /// Returns [`StagingError`] if the outstanding set cannot be read. Errors
    /// on individual jobs are logged and counted in [`CycleSummary::failed`].
    pub async fn run_cycle(&self) -> Result<CycleSummary, StagingError> {
        let entries = self.staging.drain().await?;
        let mut summary = CycleSummary::default();

        for entry in entries {
            let key = entry.key().to_string();
            match self.process_entry(entry).await {
                Ok(outcome) => summary.record(&outcome),
                Err(e) => {
                    summary.failed += 1;
                    error!(key = %key, error = %e, "Staged job left for the next cycle");
                }
            }
        }

        Ok(summary)
    }

    /// Processes one drained entry and acks it.
    ///
    /// # Errors
    ///
    /// Returns an error, leaving the job staged, when the rate gate, the
    /// database or the staging store cannot be reached.
    pub async fn process_entry(&self, entry: StagedEntry) -> Result<JobOutcome, AppError> {
        let (key, job) = match entry {
            StagedEntry::Job { key, job } => (key, job),
            StagedEntry::Malformed { key, reason } => {
                warn!(key = %key, reason = %reason, "Discarding malformed staged job");
                return self.discard(&key).await;
            }
        };

        let value = match RatingValue::try_from(job.rating_value) {
            Ok(value) => value,
            Err(_) => {
                warn!(
                    key = %key,
                    rating_value = job.rating_value,
                    "Discarding staged job with invalid rating value"
                );
                return self.discard(&key).await;
            }
        };

        let outcome = self.process_job(&job, value).await?;
        self.staging.ack(&key).await?;
        Ok(outcome)
    }

    async fn process_job(
        &self,
        job: &PendingAggregationJob,
        value: RatingValue,
    ) -> Result<JobOutcome, AppError> {
        if self.rate_gate.is_exceeded(job.provider_id).await? {
            warn!(
                provider_id = job.provider_id,
                user_id = job.user_id,
                "Daily rating limit reached, rating not aggregated"
            );
            metrics::counter!("ratings_rate_limited_total").increment(1);
            return Ok(JobOutcome::RateLimited);
        }

        let provider_id = job.provider_id;
        let strategy = ExponentialBackoff::from_millis(2)
            .factor(10)
            .max_delay(MAX_RETRY_DELAY)
            .take(CONFLICT_RETRIES);

        let updated = RetryIf::spawn(
            strategy,
            move || self.apply_rating(provider_id, value),
            AppError::is_conflict,
        )
        .await?;

        let Some(provider) = updated else {
            warn!(
                provider_id = job.provider_id,
                "Provider not found, rating not aggregated"
            );
            return Ok(JobOutcome::ProviderMissing);
        };

        // A read between intake and now may have cached the previous average.
        if let Err(e) = self
            .cache
            .invalidate(&average_rating_key(job.provider_id))
            .await
        {
            warn!(provider_id = job.provider_id, error = %e, "Failed to invalidate cached average");
        }

        // The average is already persisted; a lost increment only loosens the quota.
        if let Err(e) = self.rate_gate.increment(job.provider_id).await {
            error!(provider_id = job.provider_id, error = %e, "Failed to count rating against daily limit");
        }

        metrics::counter!("ratings_aggregated_total").increment(1);
        info!(
            provider_id = provider.id,
            average_rating = provider.average_rating,
            rating_count = provider.rating_count,
            "Provider average updated"
        );

        Ok(JobOutcome::Aggregated(provider))
    }

    /// One read-modify-write attempt. `Ok(None)` if the provider is gone.
    async fn apply_rating(
        &self,
        provider_id: i64,
        value: RatingValue,
    ) -> Result<Option<Provider>, AppError> {
        let Some(mut provider) = self.providers.find_by_id(provider_id).await? else {
            return Ok(None);
        };

        provider.apply_rating(value, self.clock.now());

        match self.providers.update_rating(&provider).await {
            Ok(updated) => Ok(Some(updated)),
            Err(e) if e.is_conflict() => {
                debug!(
                    provider_id,
                    version = provider.version,
                    "Provider changed concurrently, retrying"
                );
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    async fn discard(&self, key: &str) -> Result<JobOutcome, AppError> {
        self.staging.ack(key).await?;
        metrics::counter!("staged_jobs_discarded_total").increment(1);
        Ok(JobOutcome::Discarded)
    }
}
