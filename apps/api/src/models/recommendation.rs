use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::value::RawValue;
use sqlx::FromRow;

/// A stored recommendation. `payload` is the JSON document text exactly as
/// stored; see `recommendations::payload` for its schema.
#[derive(Debug, Clone, FromRow)]
pub struct RecommendationRow {
    pub id: i64,
    pub owner: String,
    pub transcript_id: Option<i64>,
    pub payload: String,
    pub summary: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewRecommendation {
    pub owner: String,
    pub transcript_id: Option<i64>,
    pub payload: String,
    pub summary: Option<String>,
}

/// API view of a recommendation with the payload embedded as JSON.
#[derive(Debug, Serialize)]
pub struct RecommendationView {
    pub id: i64,
    pub owner: String,
    pub transcript_id: Option<i64>,
    pub payload: Box<RawValue>,
    pub summary: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<RecommendationRow> for RecommendationView {
    type Error = serde_json::Error;

    fn try_from(row: RecommendationRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            owner: row.owner,
            transcript_id: row.transcript_id,
            payload: RawValue::from_string(row.payload)?,
            summary: row.summary,
            created_at: row.created_at,
        })
    }
}
