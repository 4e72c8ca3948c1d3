//! Backend selection from configuration.

use std::sync::Arc;

use event_feed::{ChannelFeed, EventFeed, FeedPublisher, PgNotifyFeed};
use meow_store::{InMemoryMeowStore, MeowStore, PostgresMeowStore};
use search_index::{ElasticsearchIndex, InMemorySearchIndex, SearchIndex};
use sqlx::postgres::PgPoolOptions;

use crate::config::Config;
use crate::error::StartupError;

/// Buffer size of the in-process change feed.
pub const CHANNEL_BUFFER: usize = 1024;

const MAX_DB_CONNECTIONS: u32 = 10;

/// The services the query side talks to.
pub struct Backends {
    pub index: Arc<dyn SearchIndex>,
    pub store: Arc<dyn MeowStore>,
    pub feed: Arc<dyn EventFeed>,
    /// Write end of the in-process feed; holding it keeps the feed open.
    pub publisher: Option<FeedPublisher>,
}

/// Fully in-process backends, with concrete handles for seeding.
pub struct InMemoryBackends {
    pub index: Arc<InMemorySearchIndex>,
    pub store: Arc<InMemoryMeowStore>,
    pub publisher: FeedPublisher,
    pub feed: Arc<ChannelFeed>,
}

impl InMemoryBackends {
    pub fn new() -> Self {
        let (publisher, feed) = ChannelFeed::new(CHANNEL_BUFFER);
        Self {
            index: Arc::new(InMemorySearchIndex::new()),
            store: Arc::new(InMemoryMeowStore::new()),
            publisher,
            feed: Arc::new(feed),
        }
    }
}

impl Default for InMemoryBackends {
    fn default() -> Self {
        Self::new()
    }
}

impl From<InMemoryBackends> for Backends {
    fn from(backends: InMemoryBackends) -> Self {
        Self {
            index: backends.index,
            store: backends.store,
            feed: backends.feed,
            publisher: Some(backends.publisher),
        }
    }
}

/// Connects to the configured backends.
///
/// `ELASTICSEARCH_URL` selects the Elasticsearch index (created with its
/// mapping if missing), otherwise the index lives in memory. `DATABASE_URL` selects the PostgreSQL store and its notify
/// feed (running migrations first), otherwise the store and feed live in memory.
pub async fn connect(config: &Config) -> Result<Backends, StartupError> {
    let index: Arc<dyn SearchIndex> = match &config.elasticsearch_url {
        Some(url) => {
            tracing::info!(index = %config.search_index, "using Elasticsearch search index");
            let index = ElasticsearchIndex::new(url, config.search_index.clone())?;
            index.ensure_index().await?;
            Arc::new(index)
        }
        None => {
            tracing::info!("using in-memory search index");
            Arc::new(InMemorySearchIndex::new())
        }
    };

    let Some(url) = &config.database_url else {
        tracing::info!("using in-memory store and change feed");
        return Ok(Backends {
            index,
            ..Backends::from(InMemoryBackends::new())
        });
    };

    let pool = PgPoolOptions::new()
        .max_connections(MAX_DB_CONNECTIONS)
        .connect(url)
        .await?;
    let store = PostgresMeowStore::new(pool.clone());
    store.run_migrations().await?;
    tracing::info!(channel = %config.notify_channel, "using PostgreSQL store and notify feed");

    Ok(Backends {
        index,
        store: Arc::new(store),
        feed: Arc::new(PgNotifyFeed::with_channel(pool, config.notify_channel.clone())),
        publisher: None,
    })
}
