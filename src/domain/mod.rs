//! Domain layer containing business entities and contracts.
//!
//! Defines entities, the messages that flow through the pipeline and the
//! repository interfaces, independent of infrastructure concerns.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`aggregation_job`] - Job staged for the aggregation worker
//! - [`events`] - Event published on the fan-out exchange
//!
//! # Rating Flow
//!
//! 1. Intake persists a [`entities::Rating`]
//! 2. A [`aggregation_job::PendingAggregationJob`] is staged
//! 3. A [`events::RateCreatedEvent`] is published
//! 4. Workers turn them into a new [`entities::Provider`] average and a
//!    [`entities::Notification`]

pub mod aggregation_job;
pub mod entities;
pub mod events;
pub mod repositories;
