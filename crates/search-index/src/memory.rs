use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::index::SearchIndex;
use crate::tokenizer::{tokenize, tokenize_unique};
use crate::{Meow, MeowId, Result};

const K1: f64 = 1.2;
const B: f64 = 0.75;

#[derive(Debug, Clone)]
struct IndexedDoc {
    meow: Meow,
    term_freqs: HashMap<String, u32>,
    len: u32,
}

impl IndexedDoc {
    fn new(meow: Meow) -> Self {
        let tokens = tokenize(&meow.body);
        let len = u32::try_from(tokens.len()).unwrap_or(u32::MAX);
        let mut term_freqs = HashMap::new();
        for token in tokens {
            *term_freqs.entry(token).or_insert(0) += 1;
        }
        Self {
            meow,
            term_freqs,
            len,
        }
    }
}

#[derive(Debug, Default)]
struct IndexState {
    docs: HashMap<MeowId, IndexedDoc>,
    postings: HashMap<String, HashSet<MeowId>>,
    total_len: u64,
}

impl IndexState {
    fn remove(&mut self, id: &MeowId) {
        let Some(old) = self.docs.remove(id) else {
            return;
        };
        for term in old.term_freqs.keys() {
            if let Some(ids) = self.postings.get_mut(term) {
                ids.remove(id);
                if ids.is_empty() {
                    self.postings.remove(term);
                }
            }
        }
        self.total_len -= u64::from(old.len);
    }

    fn insert(&mut self, doc: IndexedDoc) {
        let id = doc.meow.id.clone();
        for term in doc.term_freqs.keys() {
            self.postings
                .entry(term.clone())
                .or_default()
                .insert(id.clone());
        }
        self.total_len += u64::from(doc.len);
        self.docs.insert(id, doc);
    }

    /// BM25 scores for every document matching at least one term.
    fn score(&self, terms: &[String]) -> HashMap<&MeowId, f64> {
        let n = self.docs.len() as f64;
        let avg_len = if self.docs.is_empty() || self.total_len == 0 {
            1.0
        } else {
            self.total_len as f64 / n
        };

        let mut scores: HashMap<&MeowId, f64> = HashMap::new();
        for term in terms {
            let Some(ids) = self.postings.get(term) else {
                continue;
            };
            let df = ids.len() as f64;
            let idf = (1.0 + (n - df + 0.5) / (df + 0.5)).ln();

            for id in ids {
                let Some(doc) = self.docs.get(id) else {
                    continue;
                };
                let tf = f64::from(doc.term_freqs.get(term).copied().unwrap_or(0));
                let norm = K1 * (1.0 - B + B * f64::from(doc.len) / avg_len);
                *scores.entry(id).or_insert(0.0) += idf * tf * (K1 + 1.0) / (tf + norm);
            }
        }
        scores
    }
}

/// In-memory inverted index with BM25 ranking.
///
/// Upserts replace the previous postings for an ID, so repeated or
/// reordered deliveries converge on a single entry.
#[derive(Clone, Default)]
pub struct InMemorySearchIndex {
    state: Arc<RwLock<IndexState>>,
}

impl InMemorySearchIndex {
    /// Creates a new empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of indexed records.
    pub async fn len(&self) -> usize {
        self.state.read().await.docs.len()
    }

    /// Returns true if nothing is indexed.
    pub async fn is_empty(&self) -> bool {
        self.state.read().await.docs.is_empty()
    }

    /// Returns the indexed record for an ID.
    pub async fn get(&self, id: &MeowId) -> Option<Meow> {
        self.state
            .read()
            .await
            .docs
            .get(id)
            .map(|doc| doc.meow.clone())
    }
}

#[async_trait]
impl SearchIndex for InMemorySearchIndex {
    async fn upsert(&self, meow: &Meow) -> Result<()> {
        let doc = IndexedDoc::new(meow.clone());
        let mut state = self.state.write().await;
        state.remove(&meow.id);
        state.insert(doc);
        Ok(())
    }

    async fn query(&self, text: &str, offset: u64, limit: u64) -> Result<Vec<Meow>> {
        let terms = tokenize_unique(text);
        if terms.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let state = self.state.read().await;
        let mut ranked: Vec<(&MeowId, f64)> = state.score(&terms).into_iter().collect();
        ranked.sort_by(|(a_id, a_score), (b_id, b_score)| {
            b_score.total_cmp(a_score).then_with(|| a_id.cmp(b_id))
        });

        let offset = usize::try_from(offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(ranked
            .into_iter()
            .skip(offset)
            .take(limit)
            .filter_map(|(id, _)| state.docs.get(id).map(|doc| doc.meow.clone()))
            .collect())
    }
}
