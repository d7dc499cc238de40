//! In-process event bus.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;

use super::bus::{Delivery, EventBus, EventBusError, EventBusResult, Subscription};

struct Queue {
    tx: mpsc::UnboundedSender<Delivery>,
    rx: Option<mpsc::UnboundedReceiver<Delivery>>,
}

/// Fan-out bus over unbounded channels, one per bound queue.
///
/// Messages published while no queue is bound are dropped, as with a broker
/// exchange without bindings. Each queue accepts a single subscriber.
#[derive(Default)]
pub struct MemoryEventBus {
    queues: Mutex<HashMap<String, Queue>>,
    next_tag: AtomicU64,
}

impl MemoryEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Queue>> {
        self.queues.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl EventBus for MemoryEventBus {
    async fn bind_queue(&self, queue: &str) -> EventBusResult<()> {
        self.lock().entry(queue.to_string()).or_insert_with(|| {
            let (tx, rx) = mpsc::unbounded_channel();
            Queue { tx, rx: Some(rx) }
        });
        Ok(())
    }

    async fn publish_raw(&self, payload: &[u8]) -> EventBusResult<()> {
        let queues = self.lock();
        for queue in queues.values() {
            let tag = self.next_tag.fetch_add(1, Ordering::Relaxed).to_string();
            // The receiver lives as long as its queue entry.
            let _ = queue.tx.send(Delivery {
                tag,
                payload: payload.to_vec(),
            });
        }
        Ok(())
    }

    async fn subscribe(&self, queue: &str) -> EventBusResult<Box<dyn Subscription>> {
        self.bind_queue(queue).await?;

        let mut queues = self.lock();
        let entry = queues
            .get_mut(queue)
            .ok_or_else(|| EventBusError::SubscriptionFailed {
                queue: queue.to_string(),
                reason: "queue not bound".to_string(),
            })?;
        let rx = entry
            .rx
            .take()
            .ok_or_else(|| EventBusError::SubscriptionFailed {
                queue: queue.to_string(),
                reason: "queue already has a subscriber".to_string(),
            })?;

        Ok(Box::new(MemorySubscription {
            rx,
            requeue: entry.tx.clone(),
            unacked: HashSet::new(),
        }))
    }

    async fn health_check(&self) -> bool {
        true
    }
}

struct MemorySubscription {
    rx: mpsc::UnboundedReceiver<Delivery>,
    requeue: mpsc::UnboundedSender<Delivery>,
    unacked: HashSet<String>,
}

#[async_trait]
impl Subscription for MemorySubscription {
    async fn recv(&mut self) -> EventBusResult<Option<Delivery>> {
        let delivery = self.rx.recv().await;
        if let Some(d) = &delivery {
            self.unacked.insert(d.tag.clone());
        }
        Ok(delivery)
    }

    async fn ack(&mut self, delivery: &Delivery) -> EventBusResult<()> {
        self.unacked.remove(&delivery.tag);
        Ok(())
    }

    async fn reject(&mut self, delivery: &Delivery) -> EventBusResult<()> {
        if self.unacked.remove(&delivery.tag) {
            self.requeue
                .send(delivery.clone())
                .map_err(|e| EventBusError::Transport(e.to_string()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fan_out_to_every_bound_queue() {
        let bus = MemoryEventBus::new();
        let mut a = bus.subscribe("a").await.unwrap();
        let mut b = bus.subscribe("b").await.unwrap();

        bus.publish_raw(b"hello").await.unwrap();

        assert_eq!(a.recv().await.unwrap().unwrap().payload, b"hello");
        assert_eq!(b.recv().await.unwrap().unwrap().payload, b"hello");
    }

    #[tokio::test]
    async fn test_unbound_publish_is_dropped() {
        let bus = MemoryEventBus::new();
        bus.publish_raw(b"lost").await.unwrap();

        let mut sub = bus.subscribe("late").await.unwrap();
        bus.publish_raw(b"kept").await.unwrap();

        assert_eq!(sub.recv().await.unwrap().unwrap().payload, b"kept");
    }

    #[tokio::test]
    async fn test_reject_redelivers() {
        let bus = MemoryEventBus::new();
        let mut sub = bus.subscribe("q").await.unwrap();
        bus.publish_raw(b"retry me").await.unwrap();

        let first = sub.recv().await.unwrap().unwrap();
        sub.reject(&first).await.unwrap();
        let second = sub.recv().await.unwrap().unwrap();

        assert_eq!(first, second);
        sub.ack(&second).await.unwrap();
    }

    #[tokio::test]
    async fn test_single_subscriber_per_queue() {
        let bus = MemoryEventBus::new();
        let _first = bus.subscribe("q").await.unwrap();

        assert!(matches!(
            bus.subscribe("q").await,
            Err(EventBusError::SubscriptionFailed { .. })
        ));
    }
}
