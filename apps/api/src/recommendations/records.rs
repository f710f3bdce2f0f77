//! Owner-scoped reads of stored recommendations.

use crate::errors::AppError;
use crate::models::recommendation::{RecommendationRow, RecommendationView};
use crate::store::Store;

/// Loads a recommendation the owner holds. Someone else's record is
/// reported exactly like a missing one.
pub async fn owned_recommendation(
    store: &dyn Store,
    owner: &str,
    id: i64,
) -> Result<RecommendationRow, AppError> {
    store
        .get_recommendation(id)
        .await?
        .filter(|r| r.owner == owner)
        .ok_or_else(|| AppError::NotFound(format!("Recommendation {id} not found")))
}

pub async fn get_recommendation(
    store: &dyn Store,
    owner: &str,
    id: i64,
) -> Result<RecommendationView, AppError> {
    let row = owned_recommendation(store, owner, id).await?;
    to_view(row)
}

/// Newest first.
pub async fn list_recommendations(
    store: &dyn Store,
    owner: &str,
) -> Result<Vec<RecommendationView>, AppError> {
    store
        .list_recommendations(owner)
        .await?
        .into_iter()
        .map(to_view)
        .collect()
}

fn to_view(row: RecommendationRow) -> Result<RecommendationView, AppError> {
    let id = row.id;
    RecommendationView::try_from(row).map_err(|e| {
        AppError::Internal(anyhow::anyhow!(
            "Recommendation {id} has an unreadable payload: {e}"
        ))
    })
}
