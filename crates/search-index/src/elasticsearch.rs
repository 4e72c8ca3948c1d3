use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::Deserialize;
use serde_json::json;

use crate::index::SearchIndex;
use crate::{IndexError, Meow, Result};

/// Default index name holding meow documents.
pub const DEFAULT_INDEX: &str = "meows";

/// Search index backed by an Elasticsearch cluster over HTTP.
///
/// Documents are stored under their meow ID, so `PUT /{index}/_doc/{id}` is a
/// natural upsert. [`ElasticsearchIndex::ensure_index`] creates the index with
/// `id` mapped as a keyword, which the search tiebreak sorts on; an index
/// created by dynamic mapping would map `id` as text and reject the sort.
#[derive(Clone)]
pub struct ElasticsearchIndex {
    client: Client,
    base_url: Url,
    index: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: Hits,
}

#[derive(Debug, Deserialize)]
struct Hits {
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(rename = "_source")]
    source: Meow,
}

impl ElasticsearchIndex {
    /// Creates an adapter for the cluster at `base_url` using a default client.
    pub fn new(base_url: &str, index: impl Into<String>) -> Result<Self> {
        Self::with_client(Client::new(), base_url, index)
    }

    /// Creates an adapter with a preconfigured HTTP client.
    pub fn with_client(client: Client, base_url: &str, index: impl Into<String>) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| IndexError::InvalidUrl(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(IndexError::InvalidUrl(base_url.to_string()));
        }
        Ok(Self {
            client,
            base_url,
            index: index.into(),
        })
    }

    /// Returns the index name documents are written to.
    pub fn index(&self) -> &str {
        &self.index
    }

    /// Creates the index with its field mapping unless it already exists.
    ///
    /// An existing index is left untouched, mapping included.
    #[tracing::instrument(skip(self), fields(index = %self.index))]
    pub async fn ensure_index(&self) -> Result<()> {
        let url = self.endpoint(&[])?;
        let response = self.client.put(url).json(&index_mapping()).send().await?;
        match Self::check(response).await {
            Ok(_) => {
                tracing::info!("created search index");
                Ok(())
            }
            Err(IndexError::Status { status, body }) if already_exists(status, &body) => {
                tracing::debug!("search index already exists");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| IndexError::InvalidUrl(self.base_url.to_string()))?;
            path.pop_if_empty();
            path.push(&self.index);
            path.extend(segments);
        }
        Ok(url)
    }

    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(IndexError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

/// Index settings: `id` is a keyword so it can break relevance ties.
pub(crate) fn index_mapping() -> serde_json::Value {
    json!({
        "mappings": {
            "properties": {
                "id": { "type": "keyword" },
                "body": { "type": "text" },
                "created_at": { "type": "date" }
            }
        }
    })
}

fn already_exists(status: u16, body: &str) -> bool {
    status == 400 && body.contains("resource_already_exists_exception")
}

/// Builds the `_search` request body for a ranked, paginated body match.
pub(crate) fn search_body(text: &str, offset: u64, limit: u64) -> serde_json::Value {
    json!({
        "from": offset,
        "size": limit,
        "query": {
            "multi_match": {
                "query": text,
                "fields": ["body"],
                "fuzziness": "AUTO"
            }
        },
        "sort": [
            { "_score": { "order": "desc" } },
            { "id": { "order": "asc" } }
        ]
    })
}

/// Extracts the stored records from a `_search` response body.
pub(crate) fn parse_hits(body: &[u8]) -> Result<Vec<Meow>> {
    let response: SearchResponse = serde_json::from_slice(body)?;
    Ok(response.hits.hits.into_iter().map(|hit| hit.source).collect())
}

#[async_trait]
impl SearchIndex for ElasticsearchIndex {
    #[tracing::instrument(skip(self, meow), fields(index = %self.index, id = %meow.id))]
    async fn upsert(&self, meow: &Meow) -> Result<()> {
        let url = self.endpoint(&["_doc", meow.id.as_str()])?;
        let response = self.client.put(url).json(meow).send().await?;
        Self::check(response).await?;
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(index = %self.index))]
    async fn query(&self, text: &str, offset: u64, limit: u64) -> Result<Vec<Meow>> {
        let url = self.endpoint(&["_search"])?;
        let response = self
            .client
            .post(url)
            .json(&search_body(text, offset, limit))
            .send()
            .await?;
        let bytes = Self::check(response).await?.bytes().await?;
        parse_hits(&bytes)
    }
}
