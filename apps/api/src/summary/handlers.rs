//! Axum route handler for the Summaries API.

use axum::{extract::State, Json};

use crate::auth::Owner;
use crate::errors::AppError;
use crate::state::AppState;
use crate::summary::{generate_summary, TranscriptSummary};

/// POST /api/v1/summaries/generate
pub async fn handle_generate(
    State(state): State<AppState>,
    owner: Owner,
) -> Result<Json<TranscriptSummary>, AppError> {
    let summary = generate_summary(state.store.as_ref(), &state.llm, owner.as_str()).await?;
    Ok(Json(summary))
}
