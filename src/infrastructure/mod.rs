//! Infrastructure layer for external integrations.
//!
//! This layer implements the capability traits the pipeline depends on,
//! each with a Redis/PostgreSQL implementation and an in-memory one.
//!
//! # Modules
//!
//! - [`cache`] - Provider average cache
//! - [`staging`] - Staging store for pending aggregation jobs
//! - [`rate_gate`] - Daily per-provider quota
//! - [`event_bus`] - Fan-out publish/subscribe
//! - [`persistence`] - PostgreSQL repository implementations

pub mod cache;
pub mod event_bus;
pub mod persistence;
pub mod rate_gate;
pub mod staging;
