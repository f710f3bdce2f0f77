//! Axum route handler for the web search proxy.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::grounding::WebResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct WebSearchParams {
    #[serde(default)]
    pub q: String,
}

/// GET /api/v1/websearch?q=...
///
/// Public. Returns the normalised result list as a bare JSON array.
pub async fn handle_web_search(
    State(state): State<AppState>,
    Query(params): Query<WebSearchParams>,
) -> Result<Json<Vec<WebResult>>, AppError> {
    let query = params.q.trim();
    if query.is_empty() {
        return Err(AppError::Validation("missing q parameter".to_string()));
    }

    let results = state
        .search
        .search(query, state.config.web_search_max_results)
        .await?;

    Ok(Json(results))
}
