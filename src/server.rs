//! Process bootstrap and runtime setup.
//!
//! Connects PostgreSQL and Redis, wires the components, and runs the HTTP
//! server and the background loops until Ctrl-C.

use crate::config::Config;
use crate::infrastructure::cache::RedisCache;
use crate::infrastructure::event_bus::{EventBus, RedisEventBus};
use crate::infrastructure::persistence::{
    PgNotificationRepository, PgProviderRepository, PgRatingRepository, PgUserRepository,
};
use crate::infrastructure::rate_gate::RedisRateGate;
use crate::infrastructure::staging::RedisStagingStore;
use crate::routes::app_router;
use crate::state::{AppState, Components};
use crate::utils::{Clock, SystemClock};

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use redis::aio::ConnectionManager;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Which parts of the pipeline this process runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// HTTP API, aggregation worker and notification consumer.
    Serve,
    /// Aggregation worker only.
    Aggregate,
    /// Notification consumer only.
    Notify,
}

/// Runs the given role until Ctrl-C.
///
/// Initializes:
/// - PostgreSQL connection pool and migrations
/// - Redis connection shared by cache, staging store, rate gate and event bus
/// - The notification queue binding
/// - The background loops and, for [`Role::Serve`], the Axum server
///
/// # Errors
///
/// Returns an error if:
/// - Database or Redis connection fails
/// - Migrations fail
/// - The notification queue cannot be bound
/// - Server bind fails
pub async fn run(config: Config, role: Role) -> Result<()> {
    let components = connect(&config).await?;

    // Bind before anything publishes so no event is dropped by the exchange.
    components
        .event_bus
        .bind_queue(&config.notification_queue)
        .await
        .context("Failed to bind notification queue")?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
        }
        tracing::info!("Shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    let mut loops: Vec<JoinHandle<()>> = Vec::new();

    if matches!(role, Role::Serve | Role::Aggregate) {
        let worker = components.aggregation_worker(config.aggregation_poll_interval());
        loops.push(tokio::spawn(worker.run(shutdown_rx.clone())));
    }

    if matches!(role, Role::Serve | Role::Notify) {
        let consumer = components
            .notification_consumer(config.notification_queue.clone(), config.redelivery_delay());
        let rx = shutdown_rx.clone();
        loops.push(tokio::spawn(async move {
            if let Err(e) = consumer.run(rx).await {
                tracing::error!("Notification consumer failed: {}", e);
            }
        }));
    }

    if role == Role::Serve {
        serve(&config, &components, shutdown_rx.clone()).await?;
    } else {
        let mut rx = shutdown_rx.clone();
        let _ = rx.wait_for(|stop| *stop).await;
    }

    for handle in loops {
        if let Err(e) = handle.await {
            tracing::error!("Background task panicked: {}", e);
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Opens every backend and wraps it in its capability trait.
async fn connect(config: &Config) -> Result<Components> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to PostgreSQL")?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    let client = redis::Client::open(config.redis_url.as_str()).context("Invalid Redis URL")?;
    let conn = ConnectionManager::new(client.clone())
        .await
        .context("Failed to connect to Redis")?;
    tracing::info!("Connected to Redis");

    let pool = Arc::new(pool);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    Ok(Components {
        ratings: Arc::new(PgRatingRepository::new(pool.clone())),
        providers: Arc::new(PgProviderRepository::new(pool.clone())),
        users: Arc::new(PgUserRepository::new(pool.clone())),
        notifications: Arc::new(PgNotificationRepository::new(pool)),
        cache: Arc::new(RedisCache::new(
            conn.clone(),
            config.average_cache_ttl_seconds,
        )),
        staging: Arc::new(RedisStagingStore::new(
            conn.clone(),
            config.staging_set_key.clone(),
        )),
        rate_gate: Arc::new(RedisRateGate::new(
            conn.clone(),
            config.daily_rating_limit,
            clock.clone(),
        )),
        event_bus: Arc::new(RedisEventBus::new(
            client,
            conn,
            config.event_exchange.clone(),
            config.event_stream_max_len,
            config.consumer_name.clone(),
        )),
        clock,
    })
}

async fn serve(
    config: &Config,
    components: &Components,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()> {
    let state = AppState::new(components, config.average_cache_ttl_seconds);
    let app = app_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(async move {
            let _ = shutdown.wait_for(|stop| *stop).await;
        })
        .await?;

    Ok(())
}
