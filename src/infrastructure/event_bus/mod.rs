//! Fan-out event bus between rating intake and the notification consumer.
//!
//! - [`EventBus`] / [`Subscription`] - Publish, bind, consume, ack, reject
//! - [`RedisEventBus`] - Redis stream as exchange, consumer groups as queues
//! - [`MemoryEventBus`] - In-process channels

mod bus;
mod memory_bus;
mod redis_bus;

pub use bus::{Delivery, EventBus, EventBusError, EventBusResult, Subscription};
pub use memory_bus::MemoryEventBus;
pub use redis_bus::RedisEventBus;
