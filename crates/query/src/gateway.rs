//! The query gateway: search against the index, listing against the store.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use common::Meow;
use meow_store::MeowStore;
use search_index::SearchIndex;

use crate::pagination::DEFAULT_MAX_TAKE;
use crate::{
    Backend, Envelope, ListParams, Pagination, QueryError, Result, SearchParams, SearchRequest,
};

/// Limits applied by the gateway to every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Largest `take` honored; larger values are clamped.
    pub max_take: u64,
    /// Bound on every call to the index or the store.
    pub timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            max_take: DEFAULT_MAX_TAKE,
            timeout: Duration::from_secs(2),
        }
    }
}

/// Answers search and listing requests.
///
/// Search is best effort: any index failure is logged and answered with an
/// empty result. Listing has no fallback, so store failures surface to the
/// caller.
#[derive(Clone)]
pub struct QueryGateway {
    index: Arc<dyn SearchIndex>,
    store: Arc<dyn MeowStore>,
    config: GatewayConfig,
}

impl QueryGateway {
    pub fn new(index: Arc<dyn SearchIndex>, store: Arc<dyn MeowStore>) -> Self {
        Self::with_config(index, store, GatewayConfig::default())
    }

    pub fn with_config(
        index: Arc<dyn SearchIndex>,
        store: Arc<dyn MeowStore>,
        config: GatewayConfig,
    ) -> Self {
        Self {
            index,
            store,
            config,
        }
    }

    pub fn config(&self) -> GatewayConfig {
        self.config
    }

    /// Runs a ranked full-text search. Never fails; degrades to empty.
    #[tracing::instrument(skip(self, request), fields(query = %request.query, skip = request.page.skip, take = request.page.take))]
    pub async fn search(&self, request: &SearchRequest) -> Vec<Meow> {
        metrics::counter!("query_requests_total", "route" => "search").increment(1);
        let page = request.page.clamp(self.config.max_take);

        let result = self
            .bounded(
                Backend::SearchIndex,
                self.index.query(&request.query, page.skip, page.take),
            )
            .await;

        match result {
            Ok(mut meows) => {
                meows.truncate(page.take_len());
                meows
            }
            Err(error) => {
                tracing::warn!(%error, "search degraded to empty result");
                metrics::counter!("query_search_degraded_total").increment(1);
                Vec::new()
            }
        }
    }

    /// Lists meows from the system of record in creation order.
    #[tracing::instrument(skip(self))]
    pub async fn list(&self, page: &Pagination) -> Result<Vec<Meow>> {
        metrics::counter!("query_requests_total", "route" => "list").increment(1);
        let page = page.clamp(self.config.max_take);

        let result = self
            .bounded(
                Backend::Store,
                self.store.list_by_created_at(page.skip, page.take),
            )
            .await;

        match result {
            Ok(mut meows) => {
                meows.truncate(page.take_len());
                Ok(meows)
            }
            Err(error) => {
                tracing::error!(%error, "could not list meows");
                metrics::counter!("query_list_failed_total").increment(1);
                Err(error)
            }
        }
    }

    /// Validates raw search parameters and runs the search.
    pub async fn handle_search(&self, params: &SearchParams) -> Envelope<Vec<Meow>> {
        match SearchRequest::parse(params, self.config.max_take) {
            Ok(request) => Envelope::Ok(self.search(&request).await),
            Err(err) => QueryError::from(err).into(),
        }
    }

    /// Validates raw listing parameters and runs the listing.
    pub async fn handle_list(&self, params: &ListParams) -> Envelope<Vec<Meow>> {
        let page = match params.pagination(self.config.max_take) {
            Ok(page) => page,
            Err(err) => return QueryError::from(err).into(),
        };
        match self.list(&page).await {
            Ok(meows) => Envelope::Ok(meows),
            Err(err) => err.into(),
        }
    }

    async fn bounded<T, E>(
        &self,
        backend: Backend,
        call: impl Future<Output = std::result::Result<T, E>>,
    ) -> Result<T>
    where
        QueryError: From<E>,
    {
        let timeout = self.config.timeout;
        tokio::time::timeout(timeout, call)
            .await
            .map_err(|_| QueryError::Timeout { backend, timeout })?
            .map_err(QueryError::from)
    }
}
