//! Event bus traits and error types.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::events::RateCreatedEvent;

/// Errors that can occur during event bus operations.
#[derive(Debug, Error)]
pub enum EventBusError {
    #[error("Event bus connection failed: {0}")]
    Connection(String),

    #[error("Publish to '{exchange}' failed: {reason}")]
    PublishFailed { exchange: String, reason: String },

    #[error("Subscription to '{queue}' failed: {reason}")]
    SubscriptionFailed { queue: String, reason: String },

    #[error("Acknowledge failed: {0}")]
    AckFailed(String),

    #[error("Failed to encode event: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Event bus transport error: {0}")]
    Transport(String),
}

impl From<redis::RedisError> for EventBusError {
    fn from(e: redis::RedisError) -> Self {
        Self::Transport(e.to_string())
    }
}

pub type EventBusResult<T> = Result<T, EventBusError>;

/// A message handed to a subscriber.
///
/// `tag` identifies the delivery for [`Subscription::ack`] and
/// [`Subscription::reject`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub tag: String,
    pub payload: Vec<u8>,
}

/// Consuming end of one durable queue.
///
/// Deliveries stay owned by the queue until acknowledged. A rejected or
/// never-acknowledged delivery is handed out again.
#[async_trait]
pub trait Subscription: Send {
    /// Waits for the next delivery. `Ok(None)` means the queue was closed.
    async fn recv(&mut self) -> EventBusResult<Option<Delivery>>;

    /// Removes the delivery from the queue for good.
    async fn ack(&mut self, delivery: &Delivery) -> EventBusResult<()>;

    /// Leaves the delivery on the queue for redelivery.
    async fn reject(&mut self, delivery: &Delivery) -> EventBusResult<()>;
}

/// Fan-out publish/subscribe channel.
///
/// Every message published to the exchange is copied into each bound queue.
/// There is no routing-key discrimination.
///
/// # Implementations
///
/// - [`crate::infrastructure::event_bus::RedisEventBus`] - Redis stream + consumer groups
/// - [`crate::infrastructure::event_bus::MemoryEventBus`] - In-process channels
#[async_trait]
pub trait EventBus: Send + Sync {
    /// Declares a durable queue bound to the exchange. Idempotent.
    async fn bind_queue(&self, queue: &str) -> EventBusResult<()>;

    /// Publishes an opaque payload to the exchange.
    async fn publish_raw(&self, payload: &[u8]) -> EventBusResult<()>;

    /// Binds (if needed) and starts consuming `queue`.
    async fn subscribe(&self, queue: &str) -> EventBusResult<Box<dyn Subscription>>;

    /// Checks if the broker is reachable.
    async fn health_check(&self) -> bool;

    /// Publishes a rating event as flat JSON.
    async fn publish(&self, event: &RateCreatedEvent) -> EventBusResult<()> {
        let payload = event.encode()?;
        self.publish_raw(&payload).await
    }
}
