//! Persistence contract consumed by the engines.
//!
//! Every method is a single independent statement. Nothing here wraps
//! several writes in a transaction, so a failure in a later step never rolls
//! back an earlier one.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::course::CourseRow;
use crate::models::recommendation::{NewRecommendation, RecommendationRow};
use crate::models::scholarship::{NewScholarship, ScholarshipRow};
use crate::models::transcript::{TranscriptRow, TranscriptSummaryRow};

#[cfg(test)]
pub mod memory;
pub mod postgres;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Injected outage, raised only by the in-memory store.
    #[cfg(test)]
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Carried in `AppState` as `Arc<dyn Store>`.
#[async_trait]
pub trait Store: Send + Sync {
    async fn get_transcript(&self, id: i64) -> Result<Option<TranscriptRow>, StoreError>;

    /// Newest first.
    async fn list_transcripts(&self, owner: &str)
        -> Result<Vec<TranscriptSummaryRow>, StoreError>;

    async fn list_all_courses(&self) -> Result<Vec<CourseRow>, StoreError>;

    async fn create_recommendation(
        &self,
        params: NewRecommendation,
    ) -> Result<RecommendationRow, StoreError>;

    async fn get_recommendation(&self, id: i64)
        -> Result<Option<RecommendationRow>, StoreError>;

    /// Replaces the whole payload of a record the owner holds.
    /// Returns `None` when no such record exists for that owner.
    async fn update_recommendation_payload(
        &self,
        id: i64,
        owner: &str,
        payload: &str,
    ) -> Result<Option<RecommendationRow>, StoreError>;

    /// Newest first.
    async fn list_recommendations(&self, owner: &str)
        -> Result<Vec<RecommendationRow>, StoreError>;

    async fn create_scholarship(&self, params: NewScholarship)
        -> Result<ScholarshipRow, StoreError>;

    /// Newest first, at most `limit` rows.
    async fn list_recent_scholarships(
        &self,
        owner: &str,
        limit: i64,
    ) -> Result<Vec<ScholarshipRow>, StoreError>;
}

/// Returns the owner's newest transcript with its full text, if any.
pub async fn latest_transcript(
    store: &dyn Store,
    owner: &str,
) -> Result<Option<TranscriptRow>, StoreError> {
    let transcripts = store.list_transcripts(owner).await?;
    let Some(latest) = transcripts.first() else {
        return Ok(None);
    };
    Ok(store
        .get_transcript(latest.id)
        .await?
        .filter(|t| t.owner == owner))
}
