//! The JSON document stored inside a recommendation record, and the one
//! in-place edit this core performs on it (removing a course).
//!
//! `scholarships` is opaque pass-through data. It is kept as raw JSON so a
//! decode → edit courses → encode cycle reproduces it byte for byte.

use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use tracing::info;

use crate::errors::AppError;
use crate::models::scholarship::ScholarshipRow;
use crate::recommendations::records::owned_recommendation;
use crate::store::Store;

pub const PAYLOAD_SCHEMA_VERSION: u32 = 1;
pub const COURSE_KIND: &str = "course";

/// One recommended course as stored and returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseRecommendation {
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
    #[serde(default)]
    pub title: String,
    /// The advisor's rationale.
    #[serde(default)]
    pub description: String,
    #[serde(rename = "match", default)]
    pub match_score: f64,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub link: String,
    /// Join key back to the course catalog.
    #[serde(default)]
    pub course_id: i64,
}

fn default_kind() -> String {
    COURSE_KIND.to_string()
}

fn default_schema_version() -> u32 {
    // Documents written before the version field existed have the same shape.
    PAYLOAD_SCHEMA_VERSION
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecommendationPayload {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    #[serde(default)]
    pub courses: Vec<CourseRecommendation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scholarships: Option<Box<RawValue>>,
}

impl RecommendationPayload {
    /// Builds a fresh payload, embedding the owner's scholarships when there are any.
    pub fn new(
        courses: Vec<CourseRecommendation>,
        scholarships: &[ScholarshipRow],
    ) -> Result<Self, serde_json::Error> {
        let scholarships = if scholarships.is_empty() {
            None
        } else {
            Some(serde_json::value::to_raw_value(scholarships)?)
        };
        Ok(Self {
            schema_version: PAYLOAD_SCHEMA_VERSION,
            courses,
            scholarships,
        })
    }

    pub fn decode(stored: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(stored)
    }

    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Drops every course with `course_id`. Returns whether anything was removed.
    pub fn remove_course(&mut self, course_id: i64) -> bool {
        let before = self.courses.len();
        self.courses.retain(|c| c.course_id != course_id);
        self.courses.len() != before
    }
}

/// Removes one course from a stored recommendation and writes the whole
/// payload back in a single replace.
///
/// Concurrent edits of the same record are not serialized: the last writer's
/// payload wins.
pub async fn delete_course(
    store: &dyn Store,
    owner: &str,
    recommendation_id: i64,
    course_id: i64,
) -> Result<Vec<CourseRecommendation>, AppError> {
    let record = owned_recommendation(store, owner, recommendation_id).await?;

    let mut payload = RecommendationPayload::decode(&record.payload).map_err(|e| {
        AppError::Internal(anyhow::anyhow!(
            "Failed to parse payload of recommendation {recommendation_id}: {e}"
        ))
    })?;

    if !payload.remove_course(course_id) {
        return Err(AppError::NotFound(format!(
            "Course {course_id} not found in recommendation {recommendation_id}"
        )));
    }

    let encoded = payload.encode().map_err(|e| {
        AppError::Internal(anyhow::anyhow!("Failed to encode updated payload: {e}"))
    })?;

    store
        .update_recommendation_payload(recommendation_id, owner, &encoded)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Recommendation {recommendation_id} not found"))
        })?;

    info!(
        "Removed course {course_id} from recommendation {recommendation_id} ({} left)",
        payload.courses.len()
    );

    Ok(payload.courses)
}
