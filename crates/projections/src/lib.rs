//! Projection of change events into the search index.
//!
//! This crate provides the write half of the CQRS query side:
//! - [`Projection`] trait for applying one change event to a read model
//! - [`MeowProjector`], the idempotent upsert projection into a [`search_index::SearchIndex`]
//! - [`ProjectionProcessor`] for draining a feed concurrently without stopping on failures

pub mod error;
pub mod processor;
pub mod projector;

pub use error::{ProjectionError, Result};
pub use processor::{FailedDelivery, ProcessorStats, ProjectionProcessor};
pub use projector::{MeowProjector, Projection};
