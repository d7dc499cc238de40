#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use provider_rating::domain::entities::{
    NewNotification, NewProvider, NewRating, NewUser, Notification, Provider, Rating, User,
};
use provider_rating::domain::repositories::{
    NotificationRepository, ProviderRepository, RatingRepository, UserRepository,
};
use provider_rating::error::AppError;
use provider_rating::infrastructure::cache::MemoryCache;
use provider_rating::infrastructure::event_bus::{EventBus, MemoryEventBus};
use provider_rating::infrastructure::rate_gate::MemoryRateGate;
use provider_rating::infrastructure::staging::MemoryStagingStore;
use provider_rating::state::{AppState, Components};
use provider_rating::utils::ManualClock;

pub const QUEUE: &str = "rating_queue";

#[derive(Default)]
struct Tables {
    next_id: i64,
    users: BTreeMap<i64, User>,
    providers: BTreeMap<i64, Provider>,
    ratings: BTreeMap<i64, Rating>,
    notifications: BTreeMap<i64, Notification>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Relational store kept in memory, with the constraints of the SQL schema:
/// foreign keys on ratings, unique provider names, the provider `version`
/// check and the notification idempotency key.
#[derive(Default)]
pub struct MemoryDb {
    tables: Mutex<Tables>,
}

impl MemoryDb {
    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap()
    }

    pub fn rating_rows(&self, provider_id: i64) -> usize {
        self.lock()
            .ratings
            .values()
            .filter(|r| r.provider_id == provider_id)
            .count()
    }

    pub fn notification_rows(&self) -> usize {
        self.lock().notifications.len()
    }
}

#[async_trait]
impl RatingRepository for MemoryDb {
    async fn create(&self, new_rating: NewRating) -> Result<Rating, AppError> {
        let mut t = self.lock();
        if !t.providers.contains_key(&new_rating.provider_id)
            || !t.users.contains_key(&new_rating.user_id)
        {
            return Err(AppError::not_found(
                "Referenced entity does not exist",
                json!({ "constraint": "ratings_fkey" }),
            ));
        }
        let id = t.next_id();
        let rating = Rating {
            id,
            provider_id: new_rating.provider_id,
            user_id: new_rating.user_id,
            rating_value: new_rating.rating_value.as_i32(),
            created_at: new_rating.created_at,
        };
        t.ratings.insert(id, rating.clone());
        Ok(rating)
    }

    async fn count_by_provider(&self, provider_id: i64) -> Result<i64, AppError> {
        Ok(self.rating_rows(provider_id) as i64)
    }
}

#[async_trait]
impl ProviderRepository for MemoryDb {
    async fn list(&self) -> Result<Vec<Provider>, AppError> {
        let mut providers: Vec<Provider> = self.lock().providers.values().cloned().collect();
        providers.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(providers)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Provider>, AppError> {
        Ok(self.lock().providers.get(&id).cloned())
    }

    async fn exists_by_name(&self, name: &str) -> Result<bool, AppError> {
        Ok(self.lock().providers.values().any(|p| p.name == name))
    }

    async fn create(&self, new_provider: NewProvider) -> Result<Provider, AppError> {
        let mut t = self.lock();
        if t.providers.values().any(|p| p.name == new_provider.name) {
            return Err(AppError::conflict(
                "Resource already exists",
                json!({ "constraint": "providers_name_key" }),
            ));
        }
        let id = t.next_id();
        let now = Utc::now();
        let provider = Provider {
            id,
            name: new_provider.name,
            average_rating: 0.0,
            rating_count: 0,
            created_at: now,
            last_updated_date: now,
            version: 0,
        };
        t.providers.insert(id, provider.clone());
        Ok(provider)
    }

    async fn update_rating(&self, provider: &Provider) -> Result<Provider, AppError> {
        let mut t = self.lock();
        match t.providers.get_mut(&provider.id) {
            Some(row) if row.version == provider.version => {
                row.average_rating = provider.average_rating;
                row.rating_count = provider.rating_count;
                row.last_updated_date = provider.last_updated_date;
                row.version += 1;
                Ok(row.clone())
            }
            _ => Err(AppError::conflict(
                "Provider was modified concurrently",
                json!({ "provider_id": provider.id, "version": provider.version }),
            )),
        }
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let mut t = self.lock();
        let removed = t.providers.remove(&id).is_some();
        t.ratings.retain(|_, r| r.provider_id != id);
        Ok(removed)
    }
}

#[async_trait]
impl UserRepository for MemoryDb {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        Ok(self.lock().users.get(&id).cloned())
    }

    async fn create(&self, new_user: NewUser) -> Result<User, AppError> {
        let mut t = self.lock();
        let id = t.next_id();
        let user = User {
            id,
            name: new_user.name,
            last_fetch_time: None,
            created_at: Utc::now(),
        };
        t.users.insert(id, user.clone());
        Ok(user)
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let mut t = self.lock();
        let removed = t.users.remove(&id).is_some();
        t.ratings.retain(|_, r| r.user_id != id);
        Ok(removed)
    }

    async fn set_last_fetch_time(&self, id: i64, at: DateTime<Utc>) -> Result<(), AppError> {
        match self.lock().users.get_mut(&id) {
            Some(user) => {
                user.last_fetch_time = Some(at);
                Ok(())
            }
            None => Err(AppError::not_found("User not found", json!({ "id": id }))),
        }
    }
}

#[async_trait]
impl NotificationRepository for MemoryDb {
    async fn create_if_absent(
        &self,
        new_notification: NewNotification,
    ) -> Result<Option<Notification>, AppError> {
        let mut t = self.lock();
        let exists = t.notifications.values().any(|n| {
            n.provider_id == new_notification.provider_id
                && n.user_id == new_notification.user_id
                && n.created_at == new_notification.created_at
        });
        if exists {
            return Ok(None);
        }
        let id = t.next_id();
        let notification = Notification {
            id,
            provider_id: new_notification.provider_id,
            user_id: new_notification.user_id,
            rating_value: new_notification.rating_value,
            created_at: new_notification.created_at,
            recorded_at: new_notification.recorded_at,
        };
        t.notifications.insert(id, notification.clone());
        Ok(Some(notification))
    }

    async fn list_recorded_between(
        &self,
        after: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<Notification>, AppError> {
        let mut items: Vec<Notification> = self
            .lock()
            .notifications
            .values()
            .filter(|n| n.recorded_at > after && n.recorded_at <= until)
            .cloned()
            .collect();
        items.sort_by_key(|n| (n.recorded_at, n.id));
        Ok(items)
    }
}

/// The whole service wired onto in-memory backends.
pub struct TestPipeline {
    pub db: Arc<MemoryDb>,
    pub cache: Arc<MemoryCache>,
    pub staging: Arc<MemoryStagingStore>,
    pub gate: Arc<MemoryRateGate>,
    pub bus: Arc<MemoryEventBus>,
    pub clock: Arc<ManualClock>,
    pub components: Components,
    pub state: AppState,
}

pub fn start_of_test_day() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()
}

/// Builds a pipeline with the given daily limit and binds the notification
/// queue, so published events are retained for the consumer.
pub async fn pipeline(daily_limit: i64) -> TestPipeline {
    let db = Arc::new(MemoryDb::default());
    let cache = Arc::new(MemoryCache::new());
    let staging = Arc::new(MemoryStagingStore::new());
    let clock = Arc::new(ManualClock::new(start_of_test_day()));
    let gate = Arc::new(MemoryRateGate::new(daily_limit, clock.clone()));
    let bus = Arc::new(MemoryEventBus::new());
    bus.bind_queue(QUEUE).await.unwrap();

    let components = Components {
        ratings: db.clone(),
        providers: db.clone(),
        users: db.clone(),
        notifications: db.clone(),
        cache: cache.clone(),
        staging: staging.clone(),
        rate_gate: gate.clone(),
        event_bus: bus.clone(),
        clock: clock.clone(),
    };
    let state = AppState::new(&components, 60);

    TestPipeline {
        db,
        cache,
        staging,
        gate,
        bus,
        clock,
        components,
        state,
    }
}

impl TestPipeline {
    pub async fn provider(&self, name: &str) -> Provider {
        ProviderRepository::create(
            self.db.as_ref(),
            NewProvider {
                name: name.to_string(),
            },
        )
        .await
        .unwrap()
    }

    pub async fn user(&self, name: &str) -> User {
        UserRepository::create(
            self.db.as_ref(),
            NewUser {
                name: name.to_string(),
            },
        )
        .await
        .unwrap()
    }

    pub async fn provider_row(&self, id: i64) -> Provider {
        ProviderRepository::find_by_id(self.db.as_ref(), id)
            .await
            .unwrap()
            .unwrap()
    }
}
