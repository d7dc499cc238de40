//! Redis Streams event bus.
//!
//! The exchange is a stream; each durable queue is a consumer group on it, so
//! every group sees every entry. Delivered entries sit in the group's pending
//! list until `XACK`.

use async_trait::async_trait;
use redis::aio::{ConnectionManager, MultiplexedConnection};
use redis::streams::{StreamId, StreamMaxlen, StreamReadOptions, StreamReadReply};
use redis::{AsyncCommands, Client};
use std::collections::VecDeque;
use tracing::{debug, info};

use super::bus::{Delivery, EventBus, EventBusError, EventBusResult, Subscription};

const PAYLOAD_FIELD: &str = "payload";
const READ_BATCH: usize = 32;
const BLOCK_MS: usize = 200;

pub struct RedisEventBus {
    client: Client,
    conn: ConnectionManager,
    exchange: String,
    max_len: usize,
    consumer: String,
}

impl RedisEventBus {
    /// # Arguments
    ///
    /// - `client` - used to open a dedicated connection per subscription, since
    ///   blocking reads would stall the shared multiplexed connection
    /// - `conn` - shared connection for publishing
    /// - `exchange` - stream name (`EVENT_EXCHANGE`)
    /// - `max_len` - approximate stream retention (`EVENT_STREAM_MAX_LEN`)
    /// - `consumer` - stable consumer name within each group (`CONSUMER_NAME`)
    pub fn new(
        client: Client,
        conn: ConnectionManager,
        exchange: impl Into<String>,
        max_len: usize,
        consumer: impl Into<String>,
    ) -> Self {
        Self {
            client,
            conn,
            exchange: exchange.into(),
            max_len,
            consumer: consumer.into(),
        }
    }
}

#[async_trait]
impl EventBus for RedisEventBus {
    async fn bind_queue(&self, queue: &str) -> EventBusResult<()> {
        let mut conn = self.conn.clone();

        match conn
            .xgroup_create_mkstream::<_, _, _, ()>(&self.exchange, queue, "$")
            .await
        {
            Ok(()) => {
                info!(exchange = %self.exchange, queue, "Bound queue to exchange");
                Ok(())
            }
            Err(e) if e.code() == Some("BUSYGROUP") => Ok(()),
            Err(e) => Err(EventBusError::SubscriptionFailed {
                queue: queue.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    async fn publish_raw(&self, payload: &[u8]) -> EventBusResult<()> {
        let mut conn = self.conn.clone();

        let id: String = conn
            .xadd_maxlen(
                &self.exchange,
                StreamMaxlen::Approx(self.max_len),
                "*",
                &[(PAYLOAD_FIELD, payload)],
            )
            .await
            .map_err(|e| EventBusError::PublishFailed {
                exchange: self.exchange.clone(),
                reason: e.to_string(),
            })?;

        debug!(exchange = %self.exchange, id = %id, "Published event");
        Ok(())
    }

    async fn subscribe(&self, queue: &str) -> EventBusResult<Box<dyn Subscription>> {
        self.bind_queue(queue).await?;

        let conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| EventBusError::Connection(e.to_string()))?;

        info!(queue, consumer = %self.consumer, "Subscribed to queue");

        Ok(Box::new(RedisSubscription {
            conn,
            exchange: self.exchange.clone(),
            group: queue.to_string(),
            consumer: self.consumer.clone(),
            pending_cursor: Some("0".to_string()),
            backlog: VecDeque::new(),
        }))
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.conn.clone();
        conn.ping::<()>().await.is_ok()
    }
}

/// Reads a consumer group on behalf of one consumer.
///
/// While `pending_cursor` is set the subscription walks the consumer's own
/// pending list (entries delivered before but never acknowledged); once that
/// is exhausted it switches to new entries (`>`).
struct RedisSubscription {
    conn: MultiplexedConnection,
    exchange: String,
    group: String,
    consumer: String,
    pending_cursor: Option<String>,
    backlog: VecDeque<Delivery>,
}

impl RedisSubscription {
    async fn read_batch(&mut self) -> EventBusResult<Vec<StreamId>> {
        let id = self
            .pending_cursor
            .clone()
            .unwrap_or_else(|| ">".to_string());
        let opts = StreamReadOptions::default()
            .group(&self.group, &self.consumer)
            .count(READ_BATCH)
            .block(BLOCK_MS);

        let reply: Option<StreamReadReply> = self
            .conn
            .xread_options(&[&self.exchange], &[&id], &opts)
            .await?;

        Ok(reply
            .map(|r| r.keys.into_iter().flat_map(|k| k.ids).collect())
            .unwrap_or_default())
    }
}

#[async_trait]
impl Subscription for RedisSubscription {
    async fn recv(&mut self) -> EventBusResult<Option<Delivery>> {
        loop {
            if let Some(delivery) = self.backlog.pop_front() {
                return Ok(Some(delivery));
            }

            let entries = self.read_batch().await?;

            if self.pending_cursor.is_some() {
                self.pending_cursor = entries.last().map(|e| e.id.clone());
                if !entries.is_empty() {
                    debug!(queue = %self.group, count = entries.len(), "Redelivering pending entries");
                }
            }

            // Entries trimmed from the stream come back without fields; they
            // surface as empty payloads and get discarded by the consumer.
            for entry in entries {
                let payload = entry.get::<Vec<u8>>(PAYLOAD_FIELD).unwrap_or_default();
                self.backlog.push_back(Delivery {
                    tag: entry.id,
                    payload,
                });
            }
        }
    }

    async fn ack(&mut self, delivery: &Delivery) -> EventBusResult<()> {
        self.conn
            .xack::<_, _, _, i64>(&self.exchange, &self.group, &[&delivery.tag])
            .await
            .map_err(|e| EventBusError::AckFailed(e.to_string()))?;
        Ok(())
    }

    async fn reject(&mut self, delivery: &Delivery) -> EventBusResult<()> {
        debug!(tag = %delivery.tag, "Delivery left pending for redelivery");
        self.pending_cursor = Some("0".to_string());
        Ok(())
    }
}
