//! Axum route handlers for the Scholarships API.

use axum::{extract::State, Json};

use crate::auth::Owner;
use crate::errors::AppError;
use crate::scholarships::engine::{generate_scholarships, GroundingQuery, ScholarshipBatch};
use crate::state::AppState;

/// POST /api/v1/scholarships/generate
///
/// Uses the owner's most recent transcript. The search query and result cap
/// come from configuration.
pub async fn handle_generate(
    State(state): State<AppState>,
    owner: Owner,
) -> Result<Json<ScholarshipBatch>, AppError> {
    let grounding = GroundingQuery {
        query: state.config.scholarship_search_query.clone(),
        max_results: state.config.web_search_max_results,
    };

    let batch = generate_scholarships(
        state.store.as_ref(),
        &state.llm,
        &state.search,
        &grounding,
        owner.as_str(),
    )
    .await?;

    Ok(Json(batch))
}
