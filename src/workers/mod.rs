//! Long-running background loops.
//!
//! - [`AggregationWorker`] - Polls the staging store and updates provider averages
//! - [`NotificationConsumer`] - Consumes rating events into notifications
//!
//! Both stop when the shared `watch` shutdown flag turns `true`.

pub mod aggregation;
pub mod notification;

pub use aggregation::{AggregationWorker, CycleSummary, JobOutcome};
pub use notification::{DeliveryOutcome, NotificationConsumer};
