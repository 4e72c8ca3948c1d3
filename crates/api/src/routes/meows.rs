//! Chronological listing endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use common::Meow;
use query::ListParams;

use crate::AppState;
use crate::error::{ApiError, respond};

/// GET /meows?skip=&take=: Meows from the system of record, oldest first.
///
/// A repeated key keeps its first value.
#[tracing::instrument(skip(state))]
pub async fn list(
    State(state): State<Arc<AppState>>,
    pairs: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<Vec<Meow>>, ApiError> {
    let Query(pairs) = pairs?;
    let params = ListParams::from_pairs(pairs);
    respond(state.gateway.handle_list(&params).await)
}
