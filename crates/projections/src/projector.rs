//! The search projection and the trait it implements.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use common::Meow;
use event_feed::{ChangeEvent, EventKind};
use search_index::SearchIndex;

use crate::{ProjectionError, Result};

/// A projection that applies change events to a read model.
///
/// Implementations must be safe to invoke again with an event they have
/// already seen, and must not assume any order between invocations.
#[async_trait]
pub trait Projection: Send + Sync {
    /// Returns the name of this projection.
    fn name(&self) -> &'static str;

    /// Applies a single change event.
    async fn apply(&self, event: &ChangeEvent) -> Result<()>;
}

/// Projects meow change events into the search index.
///
/// Each call issues exactly one upsert keyed by the meow ID and never
/// retries; redelivery belongs to the feed.
#[derive(Clone)]
pub struct MeowProjector {
    index: Arc<dyn SearchIndex>,
    timeout: Duration,
}

impl MeowProjector {
    /// Upsert timeout used by [`MeowProjector::new`].
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

    /// Creates a projector writing to the given index.
    pub fn new(index: Arc<dyn SearchIndex>) -> Self {
        Self::with_timeout(index, Self::DEFAULT_TIMEOUT)
    }

    /// Creates a projector with a custom upsert timeout.
    pub fn with_timeout(index: Arc<dyn SearchIndex>, timeout: Duration) -> Self {
        Self { index, timeout }
    }

    fn record_from(event: &ChangeEvent) -> Result<Meow> {
        if event.id.is_blank() {
            return Err(ProjectionError::MalformedEvent {
                id: event.id.clone(),
                reason: "missing id".to_string(),
            });
        }
        Ok(event.record())
    }
}

#[async_trait]
impl Projection for MeowProjector {
    fn name(&self) -> &'static str {
        "MeowProjector"
    }

    #[tracing::instrument(skip(self, event), fields(id = %event.id, kind = %event.kind))]
    async fn apply(&self, event: &ChangeEvent) -> Result<()> {
        let meow = match event.kind {
            EventKind::Created => Self::record_from(event)?,
            other => {
                return Err(ProjectionError::NotIdempotentConflict {
                    kind: other.to_string(),
                });
            }
        };

        tokio::time::timeout(self.timeout, self.index.upsert(&meow))
            .await
            .map_err(|_| ProjectionError::Timeout(self.timeout))??;

        tracing::debug!("meow indexed");
        Ok(())
    }
}
