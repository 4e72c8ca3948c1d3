use std::sync::Arc;

use async_trait::async_trait;
use futures_util::stream;
use tokio::sync::{Mutex, mpsc};

use crate::{ChangeEvent, EventFeed, EventStream, FeedError, Result};

/// Publishing half of an in-process feed.
#[derive(Clone)]
pub struct FeedPublisher {
    sender: mpsc::Sender<ChangeEvent>,
}

impl FeedPublisher {
    /// Publishes an event, waiting for buffer space if the feed is full.
    pub async fn publish(&self, event: ChangeEvent) -> Result<()> {
        self.sender.send(event).await.map_err(|_| FeedError::Closed)
    }
}

/// In-process change-event feed backed by a bounded tokio channel.
///
/// Used by tests and by the server when no database is configured.
/// Only one subscriber may consume it.
#[derive(Clone)]
pub struct ChannelFeed {
    receiver: Arc<Mutex<Option<mpsc::Receiver<ChangeEvent>>>>,
}

impl ChannelFeed {
    /// Creates a feed and its publisher with the given buffer size.
    pub fn new(buffer: usize) -> (FeedPublisher, Self) {
        let (sender, receiver) = mpsc::channel(buffer.max(1));
        (
            FeedPublisher { sender },
            Self {
                receiver: Arc::new(Mutex::new(Some(receiver))),
            },
        )
    }
}

#[async_trait]
impl EventFeed for ChannelFeed {
    async fn subscribe(&self) -> Result<EventStream> {
        let receiver = self
            .receiver
            .lock()
            .await
            .take()
            .ok_or(FeedError::AlreadySubscribed)?;

        let stream = stream::unfold(receiver, |mut receiver| async move {
            receiver.recv().await.map(|event| (Ok(event), receiver))
        });
        Ok(Box::pin(stream))
    }
}
