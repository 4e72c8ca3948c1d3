//! Request parameters and the shared pagination contract.

use crate::ClientError;

/// `skip` used when the caller omits it.
pub const DEFAULT_SKIP: u64 = 0;
/// `take` used when the caller omits it.
pub const DEFAULT_TAKE: u64 = 100;
/// Upper bound applied to `take` unless configured otherwise.
pub const DEFAULT_MAX_TAKE: u64 = 1000;

/// Raw search parameters as they arrive from the transport.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchParams {
    pub query: Option<String>,
    pub skip: Option<String>,
    pub take: Option<String>,
}

/// Raw listing parameters as they arrive from the transport.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListParams {
    pub skip: Option<String>,
    pub take: Option<String>,
}

/// A validated `[skip, skip + take)` window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub skip: u64,
    pub take: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            skip: DEFAULT_SKIP,
            take: DEFAULT_TAKE,
        }
    }
}

impl Pagination {
    pub fn new(skip: u64, take: u64) -> Self {
        Self { skip, take }
    }

    /// Parses raw `skip`/`take` values.
    ///
    /// Absent or empty values take their defaults. Anything other than plain
    /// ASCII digits fitting in a `u64` is rejected. `take` is clamped to
    /// `max_take`.
    pub fn parse(
        skip: Option<&str>,
        take: Option<&str>,
        max_take: u64,
    ) -> Result<Self, ClientError> {
        let skip = parse_bound(skip, DEFAULT_SKIP, ClientError::InvalidSkip)?;
        let take = parse_bound(take, DEFAULT_TAKE, ClientError::InvalidTake)?;
        Ok(Self::new(skip, take).clamp(max_take))
    }

    /// Caps `take` at `max_take`.
    pub fn clamp(self, max_take: u64) -> Self {
        Self {
            skip: self.skip,
            take: self.take.min(max_take),
        }
    }

    /// `take` as a length bound for in-process truncation.
    pub(crate) fn take_len(&self) -> usize {
        usize::try_from(self.take).unwrap_or(usize::MAX)
    }
}

impl SearchParams {
    /// Collects parameters from decoded query-string pairs.
    ///
    /// A repeated key keeps its first value; unknown keys are ignored.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut params = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "query" => &mut params.query,
                "skip" => &mut params.skip,
                "take" => &mut params.take,
                _ => continue,
            };
            slot.get_or_insert(value);
        }
        params
    }
}

impl ListParams {
    /// Collects parameters from decoded query-string pairs.
    ///
    /// A repeated key keeps its first value; unknown keys are ignored.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut params = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "skip" => &mut params.skip,
                "take" => &mut params.take,
                _ => continue,
            };
            slot.get_or_insert(value);
        }
        params
    }

    pub fn pagination(&self, max_take: u64) -> Result<Pagination, ClientError> {
        Pagination::parse(self.skip.as_deref(), self.take.as_deref(), max_take)
    }
}

fn parse_bound(raw: Option<&str>, default: u64, err: ClientError) -> Result<u64, ClientError> {
    match raw {
        None | Some("") => Ok(default),
        Some(s) if s.bytes().all(|b| b.is_ascii_digit()) => s.parse().map_err(|_| err),
        Some(_) => Err(err),
    }
}

/// A validated full-text search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    pub page: Pagination,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, page: Pagination) -> Self {
        Self {
            query: query.into(),
            page,
        }
    }

    /// Validates raw parameters: `query` first, then `skip`, then `take`.
    ///
    /// A query of only whitespace counts as missing.
    pub fn parse(params: &SearchParams, max_take: u64) -> Result<Self, ClientError> {
        let query = params
            .query
            .as_deref()
            .filter(|q| !q.trim().is_empty())
            .ok_or(ClientError::MissingQuery)?;
        let page = Pagination::parse(params.skip.as_deref(), params.take.as_deref(), max_take)?;
        Ok(Self::new(query, page))
    }
}
