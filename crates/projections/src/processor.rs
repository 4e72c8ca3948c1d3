//! Projection processor for draining a change-event feed.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use event_feed::{ChangeEvent, EventFeed, EventStream};
use futures_util::StreamExt;
use tokio::sync::mpsc;

use crate::projector::Projection;
use crate::{ProjectionError, Result};

/// Default number of events applied at the same time.
pub const DEFAULT_CONCURRENCY: usize = 16;

/// First pause before subscribing again after a failed subscription.
pub const RESUBSCRIBE_DELAY: Duration = Duration::from_millis(500);

/// Longest pause between subscription attempts.
pub const MAX_RESUBSCRIBE_DELAY: Duration = Duration::from_secs(30);

/// A delivery the projection could not apply.
///
/// `event` is `None` when the feed delivered something that never decoded
/// into an event.
#[derive(Debug)]
pub struct FailedDelivery {
    pub event: Option<ChangeEvent>,
    pub error: ProjectionError,
}

/// Outcome counters for one run of the processor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessorStats {
    pub applied: u64,
    pub failed: u64,
}

/// Feeds change events to a projection.
///
/// The processor supports:
/// - Single event delivery, with logging and metrics
/// - Draining a stream with bounded concurrency until it ends
/// - Reporting failures to the transport through an optional channel
///
/// A failed delivery never stops the loop.
pub struct ProjectionProcessor {
    projection: Arc<dyn Projection>,
    concurrency: usize,
    failures: Option<mpsc::UnboundedSender<FailedDelivery>>,
}

impl ProjectionProcessor {
    /// Creates a processor for the given projection.
    pub fn new(projection: Arc<dyn Projection>) -> Self {
        Self {
            projection,
            concurrency: DEFAULT_CONCURRENCY,
            failures: None,
        }
    }

    /// Sets how many events may be applied at once. Zero is treated as one.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Forwards every failed delivery to `sender`, e.g. a redelivery queue.
    pub fn with_failure_channel(mut self, sender: mpsc::UnboundedSender<FailedDelivery>) -> Self {
        self.failures = Some(sender);
        self
    }

    /// Returns the configured concurrency.
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Delivers a single event to the projection.
    #[tracing::instrument(skip(self, event), fields(projection = self.projection.name(), id = %event.id))]
    pub async fn process_event(&self, event: &ChangeEvent) -> Result<()> {
        match self.projection.apply(event).await {
            Ok(()) => {
                metrics::counter!("projector_events_applied_total").increment(1);
                Ok(())
            }
            Err(error) => {
                let kind = error.kind();
                tracing::warn!(%error, %kind, "failed to project event");
                metrics::counter!("projector_events_failed_total", "kind" => kind.to_string())
                    .increment(1);
                Err(error)
            }
        }
    }

    /// Drains the stream until it ends, applying events concurrently.
    #[tracing::instrument(skip(self, stream), fields(projection = self.projection.name()))]
    pub async fn run(&self, stream: EventStream) -> ProcessorStats {
        let applied = AtomicU64::new(0);
        let failed = AtomicU64::new(0);
        let (applied_ref, failed_ref) = (&applied, &failed);

        stream
            .for_each_concurrent(self.concurrency, |delivery| async move {
                let outcome = match delivery {
                    Ok(event) => match self.process_event(&event).await {
                        Ok(()) => Ok(()),
                        Err(error) => Err((Some(event), error)),
                    },
                    Err(feed_error) => {
                        let error = ProjectionError::from(feed_error);
                        let kind = error.kind();
                        tracing::warn!(%error, %kind, "dropped undecodable delivery");
                        metrics::counter!("projector_events_failed_total", "kind" => kind.to_string())
                            .increment(1);
                        Err((None, error))
                    }
                };

                match outcome {
                    Ok(()) => {
                        applied_ref.fetch_add(1, Ordering::Relaxed);
                    }
                    Err((event, error)) => {
                        failed_ref.fetch_add(1, Ordering::Relaxed);
                        self.report(FailedDelivery { event, error });
                    }
                }
            })
            .await;

        let stats = ProcessorStats {
            applied: applied.load(Ordering::Relaxed),
            failed: failed.load(Ordering::Relaxed),
        };
        tracing::info!(applied = stats.applied, failed = stats.failed, "feed drained");
        stats
    }

    /// Subscribes to the feed and drains it.
    pub async fn run_feed(&self, feed: &dyn EventFeed) -> Result<ProcessorStats> {
        let stream = feed.subscribe().await?;
        Ok(self.run(stream).await)
    }

    /// Subscribes to the feed and drains it, retrying failed subscriptions.
    ///
    /// A subscription failing on an unavailable backend is retried with
    /// exponential backoff, from [`RESUBSCRIBE_DELAY`] up to
    /// [`MAX_RESUBSCRIBE_DELAY`], for as long as the future is polled. A
    /// client-side failure cannot succeed on retry and ends the run.
    pub async fn run_feed_with_retry(&self, feed: &dyn EventFeed) -> ProcessorStats {
        let mut delay = RESUBSCRIBE_DELAY;
        loop {
            match feed.subscribe().await {
                Ok(stream) => return self.run(stream).await,
                Err(error) if error.kind().is_client() => {
                    tracing::error!(%error, "cannot subscribe to change feed");
                    return ProcessorStats::default();
                }
                Err(error) => {
                    tracing::warn!(%error, retry_in = ?delay, "change feed subscription failed");
                    metrics::counter!("projector_subscribe_failed_total").increment(1);
                    tokio::time::sleep(delay).await;
                    delay = (delay * 2).min(MAX_RESUBSCRIBE_DELAY);
                }
            }
        }
    }

    fn report(&self, failure: FailedDelivery) {
        if let Some(sender) = &self.failures
            && sender.send(failure).is_err()
        {
            tracing::debug!("failure channel closed, dropping report");
        }
    }
}
