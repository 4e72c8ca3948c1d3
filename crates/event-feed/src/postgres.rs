use std::time::Duration;

use async_trait::async_trait;
use common::{Meow, MeowId};
use futures_util::stream;
use sqlx::postgres::PgListener;
use sqlx::{PgPool, Row};

use crate::{ChangeEvent, ChangeNotice, EventFeed, EventStream, FeedError, Result};

/// Default `LISTEN` channel the command side notifies on.
pub const DEFAULT_CHANNEL: &str = "meow_created";

/// Pause before listening again after the listener connection failed.
pub const RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// Change-event feed over PostgreSQL `LISTEN`/`NOTIFY`.
///
/// Each notification payload is a JSON-encoded [`ChangeNotice`]; the record
/// it names is loaded from the `meows` table. A payload that fails to decode
/// is yielded as [`FeedError::Decode`]. A lost connection is yielded as
/// [`FeedError::Database`] and the listener reconnects; the stream itself
/// never ends. Notices sent while disconnected are lost, which the
/// at-least-once contract leaves to the publisher's redelivery.
#[derive(Clone)]
pub struct PgNotifyFeed {
    pool: PgPool,
    channel: String,
}

impl PgNotifyFeed {
    /// Creates a feed listening on [`DEFAULT_CHANNEL`].
    pub fn new(pool: PgPool) -> Self {
        Self::with_channel(pool, DEFAULT_CHANNEL)
    }

    /// Creates a feed listening on a custom channel.
    pub fn with_channel(pool: PgPool, channel: impl Into<String>) -> Self {
        Self {
            pool,
            channel: channel.into(),
        }
    }

    /// Returns the channel name this feed listens on.
    pub fn channel(&self) -> &str {
        &self.channel
    }
}

#[async_trait]
impl EventFeed for PgNotifyFeed {
    #[tracing::instrument(skip(self), fields(channel = %self.channel))]
    async fn subscribe(&self) -> Result<EventStream> {
        let mut listener = PgListener::connect_with(&self.pool).await?;
        listener.listen(&self.channel).await?;
        tracing::info!("listening for change events");

        let listening = Listening {
            listener,
            pool: self.pool.clone(),
            reconnecting: false,
        };
        let stream = stream::unfold(listening, |mut listening| async move {
            let delivery = listening.next_event().await;
            Some((delivery, listening))
        });

        Ok(Box::pin(stream))
    }
}

struct Listening {
    listener: PgListener,
    pool: PgPool,
    reconnecting: bool,
}

impl Listening {
    async fn next_event(&mut self) -> Result<ChangeEvent> {
        if std::mem::take(&mut self.reconnecting) {
            tokio::time::sleep(RECONNECT_DELAY).await;
        }

        // `recv` reconnects and re-listens on the next call after an error.
        let notification = match self.listener.recv().await {
            Ok(notification) => notification,
            Err(e) => {
                tracing::warn!(error = %e, "change listener failed, reconnecting");
                self.reconnecting = true;
                return Err(FeedError::Database(e));
            }
        };

        let notice = ChangeNotice::from_json(notification.payload())?;
        let meow = load_record(&self.pool, &notice.id).await?;
        Ok(notice.into_event(meow))
    }
}

async fn load_record(pool: &PgPool, id: &MeowId) -> Result<Meow> {
    let row = sqlx::query("SELECT id, body, created_at FROM meows WHERE id = $1")
        .bind(id.as_str())
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| FeedError::MissingRecord(id.clone()))?;

    Ok(Meow::new(
        row.try_get::<String, _>("id")?,
        row.try_get::<String, _>("body")?,
        row.try_get("created_at")?,
    ))
}
