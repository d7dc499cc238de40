//! Notification consumer: turns rating events into notification records.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::application::services::{NotificationService, RecordOutcome};
use crate::domain::events::RateCreatedEvent;
use crate::infrastructure::event_bus::{Delivery, EventBus, EventBusResult, Subscription};

/// What the consumer did with one delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Created,
    /// Already recorded by an earlier delivery; acked.
    Duplicate,
    /// Payload did not decode; acked and dropped.
    Discarded,
    /// Persisting failed; left on the queue for redelivery.
    Requeued,
}

/// Subscriber on the notification queue.
///
/// Acknowledges a delivery only once its notification is stored (or known to
/// be stored already). Undecodable payloads are acknowledged and dropped.
pub struct NotificationConsumer {
    event_bus: Arc<dyn EventBus>,
    queue: String,
    notifications: Arc<NotificationService>,
    redelivery_delay: Duration,
}

impl NotificationConsumer {
    pub fn new(
        event_bus: Arc<dyn EventBus>,
        queue: impl Into<String>,
        notifications: Arc<NotificationService>,
        redelivery_delay: Duration,
    ) -> Self {
        Self {
            event_bus,
            queue: queue.into(),
            notifications,
            redelivery_delay,
        }
    }

    /// Consumes the queue until `shutdown` turns `true`, its sender is dropped
    /// or the queue is closed.
    ///
    /// A delivery interrupted by shutdown is never acknowledged, so the broker
    /// hands it out again on the next start.
    ///
    /// # Errors
    ///
    /// Returns an error if the queue cannot be subscribed to.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> EventBusResult<()> {
        let mut subscription = self.event_bus.subscribe(&self.queue).await?;
        info!(queue = %self.queue, "Notification consumer started");

        while !*shutdown.borrow() {
            let next = tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    continue;
                }
                next = subscription.recv() => next,
            };

            let pause = match next {
                Ok(Some(delivery)) => {
                    match self.handle(subscription.as_mut(), &delivery).await {
                        Ok(DeliveryOutcome::Requeued) => true,
                        Ok(_) => false,
                        Err(e) => {
                            error!(tag = %delivery.tag, error = %e, "Failed to settle delivery");
                            true
                        }
                    }
                }
                Ok(None) => {
                    warn!(queue = %self.queue, "Queue closed");
                    break;
                }
                Err(e) => {
                    error!(queue = %self.queue, error = %e, "Failed to receive from queue");
                    true
                }
            };

            if pause {
                tokio::select! {
                    _ = tokio::time::sleep(self.redelivery_delay) => {}
                    _ = shutdown.changed() => {}
                }
            }
        }

        info!(queue = %self.queue, "Notification consumer stopped");
        Ok(())
    }

    /// Records one delivery and settles it on `subscription`.
    ///
    /// # Errors
    ///
    /// Returns an error if the ack or reject itself fails.
    pub async fn handle(
        &self,
        subscription: &mut dyn Subscription,
        delivery: &Delivery,
    ) -> EventBusResult<DeliveryOutcome> {
        let event = match RateCreatedEvent::decode(&delivery.payload) {
            Ok(event) => event,
            Err(e) => {
                warn!(tag = %delivery.tag, error = %e, "Discarding undecodable rating event");
                subscription.ack(delivery).await?;
                metrics::counter!("notification_messages_discarded_total").increment(1);
                return Ok(DeliveryOutcome::Discarded);
            }
        };

        match self.notifications.record(&event).await {
            Ok(RecordOutcome::Created(_)) => {
                subscription.ack(delivery).await?;
                metrics::counter!("notifications_created_total").increment(1);
                Ok(DeliveryOutcome::Created)
            }
            Ok(RecordOutcome::Duplicate) => {
                subscription.ack(delivery).await?;
                Ok(DeliveryOutcome::Duplicate)
            }
            Err(e) => {
                error!(
                    tag = %delivery.tag,
                    provider_id = event.provider_id,
                    user_id = event.user_id,
                    error = %e,
                    "Failed to persist notification, leaving for redelivery"
                );
                subscription.reject(delivery).await?;
                Ok(DeliveryOutcome::Requeued)
            }
        }
    }
}
