//! Full-text search endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use common::Meow;
use query::SearchParams;

use crate::AppState;
use crate::error::{ApiError, respond};

/// GET /search?query=&skip=&take=: Ranked search over projected meows.
///
/// Index failures answer `200` with an empty array. A repeated key keeps its
/// first value.
#[tracing::instrument(skip(state))]
pub async fn search(
    State(state): State<Arc<AppState>>,
    pairs: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<Vec<Meow>>, ApiError> {
    let Query(pairs) = pairs?;
    let params = SearchParams::from_pairs(pairs);
    respond(state.gateway.handle_search(&params).await)
}
