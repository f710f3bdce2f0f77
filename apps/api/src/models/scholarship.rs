use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One persisted scholarship suggestion. Rows accumulate per generation batch.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ScholarshipRow {
    pub id: i64,
    pub owner: String,
    pub title: String,
    pub description: Option<String>,
    pub match_score: Option<f64>,
    pub link: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewScholarship {
    pub owner: String,
    pub title: String,
    pub description: Option<String>,
    pub match_score: Option<f64>,
    pub link: Option<String>,
}
