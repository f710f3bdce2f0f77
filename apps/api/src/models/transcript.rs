use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A parsed transcript. Upload and text extraction happen elsewhere;
/// this core only reads the extracted text.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TranscriptRow {
    pub id: i64,
    pub owner: String,
    pub filename: String,
    pub text_extracted: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TranscriptRow {
    /// The extracted text, or `None` when it is missing or blank.
    pub fn usable_text(&self) -> Option<&str> {
        self.text_extracted
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

/// Listing view of a transcript, without the (potentially large) text.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TranscriptSummaryRow {
    pub id: i64,
    pub owner: String,
    pub filename: String,
    pub created_at: DateTime<Utc>,
}
