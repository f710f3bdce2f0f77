use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A catalog course. Immutable for the duration of one generation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CourseRow {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub learning_outcomes: Option<String>,
    pub course_link: Option<String>,
}

impl CourseRow {
    /// Code as compared against transcript-extracted codes.
    pub fn normalized_code(&self) -> String {
        normalize_code(&self.code)
    }
}

pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}
