use std::pin::Pin;

use async_trait::async_trait;
use futures_core::Stream;

use crate::{ChangeEvent, Result};

/// A stream of delivered change events.
///
/// An `Err` item is one bad delivery, not the end of the feed.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<ChangeEvent>> + Send>>;

/// Source of change events for the projector.
///
/// Redelivery and delivery guarantees are owned by the implementation;
/// consumers only see an at-least-once stream.
#[async_trait]
pub trait EventFeed: Send + Sync {
    /// Opens a subscription and returns its event stream.
    async fn subscribe(&self) -> Result<EventStream>;
}
