//! Shared application state and component wiring.

use std::sync::Arc;
use std::time::Duration;

use crate::application::services::{
    NotificationService, ProviderService, RatingService, UserService,
};
use crate::domain::repositories::{
    NotificationRepository, ProviderRepository, RatingRepository, UserRepository,
};
use crate::infrastructure::cache::CacheService;
use crate::infrastructure::event_bus::EventBus;
use crate::infrastructure::rate_gate::RateGate;
use crate::infrastructure::staging::StagingStore;
use crate::utils::Clock;
use crate::workers::{AggregationWorker, NotificationConsumer};

/// Every backend the service talks to, as trait objects.
///
/// Built once by the server from PostgreSQL and Redis, or by tests from the
/// in-memory implementations.
#[derive(Clone)]
pub struct Components {
    pub ratings: Arc<dyn RatingRepository>,
    pub providers: Arc<dyn ProviderRepository>,
    pub users: Arc<dyn UserRepository>,
    pub notifications: Arc<dyn NotificationRepository>,
    pub cache: Arc<dyn CacheService>,
    pub staging: Arc<dyn StagingStore>,
    pub rate_gate: Arc<dyn RateGate>,
    pub event_bus: Arc<dyn EventBus>,
    pub clock: Arc<dyn Clock>,
}

impl Components {
    pub fn notification_service(&self) -> Arc<NotificationService> {
        Arc::new(NotificationService::new(
            self.notifications.clone(),
            self.users.clone(),
            self.clock.clone(),
        ))
    }

    pub fn aggregation_worker(&self, poll_interval: Duration) -> AggregationWorker {
        AggregationWorker::new(
            self.staging.clone(),
            self.rate_gate.clone(),
            self.providers.clone(),
            self.cache.clone(),
            self.clock.clone(),
            poll_interval,
        )
    }

    pub fn notification_consumer(
        &self,
        queue: impl Into<String>,
        redelivery_delay: Duration,
    ) -> NotificationConsumer {
        NotificationConsumer::new(
            self.event_bus.clone(),
            queue,
            self.notification_service(),
            redelivery_delay,
        )
    }
}

/// State shared by all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub rating_service: Arc<RatingService>,
    pub provider_service: Arc<ProviderService>,
    pub user_service: Arc<UserService>,
    pub notification_service: Arc<NotificationService>,
    pub cache: Arc<dyn CacheService>,
    pub staging: Arc<dyn StagingStore>,
    pub event_bus: Arc<dyn EventBus>,
}

impl AppState {
    /// Builds the services on top of `components`.
    ///
    /// `average_ttl_seconds` is the lifetime of cached provider averages.
    pub fn new(components: &Components, average_ttl_seconds: u64) -> Self {
        let c = components;
        Self {
            rating_service: Arc::new(RatingService::new(
                c.ratings.clone(),
                c.cache.clone(),
                c.staging.clone(),
                c.event_bus.clone(),
                c.clock.clone(),
            )),
            provider_service: Arc::new(ProviderService::new(
                c.providers.clone(),
                c.cache.clone(),
                average_ttl_seconds,
            )),
            user_service: Arc::new(UserService::new(c.users.clone())),
            notification_service: c.notification_service(),
            cache: c.cache.clone(),
            staging: c.staging.clone(),
            event_bus: c.event_bus.clone(),
        }
    }
}
