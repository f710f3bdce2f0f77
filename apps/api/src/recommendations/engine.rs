//! Recommendation Engine: Orchestrates the two-phase generation pipeline.
//!
//! Flow: load transcript → (A) extract completed codes → (B) filter catalog →
//!       (C) short-circuit on no candidates → (D) recommend → (E) enrich,
//!       dedup, sort → (F) merge recent scholarships and persist.
//!
//! An inference failure in A or D aborts the call before anything is written.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::llm_client::prompts::{JSON_ONLY_INSTRUCTION, MATCH_SCALE_INSTRUCTION};
use crate::llm_client::{parse_json_reply, ChatMessage, LlmClient, LlmError};
use crate::models::course::{normalize_code, CourseRow};
use crate::models::recommendation::NewRecommendation;
use crate::models::scholarship::ScholarshipRow;
use crate::recommendations::payload::{CourseRecommendation, RecommendationPayload, COURSE_KIND};
use crate::recommendations::prompts::{
    EXTRACTION_SYSTEM, NO_PREFERENCE, RECOMMENDATION_PROMPT_TEMPLATE,
    RECOMMENDATION_SYSTEM_TEMPLATE,
};
use crate::store::Store;
use crate::text::truncate_chars;

/// Upper bound on courses kept from one recommendation call.
pub const MAX_RECOMMENDATIONS: usize = 5;
/// How many of the owner's newest scholarships are merged into the payload.
pub const MERGED_SCHOLARSHIP_LIMIT: i64 = 10;
const CANDIDATE_DESCRIPTION_CHARS: usize = 150;
const RECORD_SUMMARY: &str = "Course Recommendation";
pub const NO_CANDIDATES_MESSAGE: &str = "No new courses available.";

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateRecommendationRequest {
    #[serde(default)]
    pub transcript_id: i64,
    #[serde(default)]
    pub preference: String,
}

/// Result of one generation. `id`/`created_at` are absent when nothing was
/// persisted (no candidates left after filtering).
#[derive(Debug, Clone, Serialize)]
pub struct RecommendationOutcome {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    pub courses: Vec<CourseRecommendation>,
    pub scholarships: Vec<ScholarshipRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub user_pref: String,
    pub analyzed_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
struct CompletedCodes {
    #[serde(default)]
    completed_codes: Vec<String>,
}

/// One pick as the model returns it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SelectedCourse {
    #[serde(default)]
    pub course_id: i64,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub rationale: String,
    #[serde(rename = "match", default)]
    pub match_score: f64,
}

#[derive(Debug, Deserialize)]
struct SelectionEnvelope {
    #[serde(default)]
    recommendations: Vec<SelectedCourse>,
}

/// Compact catalog entry sent to the model.
#[derive(Debug, Serialize)]
struct PromptCourse<'a> {
    id: i64,
    code: &'a str,
    name: &'a str,
    desc: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Pipeline
// ────────────────────────────────────────────────────────────────────────────

pub async fn generate_recommendation(
    store: &dyn Store,
    llm: &LlmClient,
    owner: &str,
    request: GenerateRecommendationRequest,
) -> Result<RecommendationOutcome, AppError> {
    if request.transcript_id <= 0 {
        return Err(AppError::Validation(
            "transcript_id must be a positive integer".to_string(),
        ));
    }

    let transcript = store
        .get_transcript(request.transcript_id)
        .await?
        .filter(|t| t.owner == owner)
        .ok_or_else(|| {
            AppError::NotFound(format!("Transcript {} not found", request.transcript_id))
        })?;
    let transcript_text = transcript.usable_text().ok_or_else(|| {
        AppError::Validation("Transcript has no extracted text".to_string())
    })?;

    // Phase A
    let completed = extract_completed_codes(llm, transcript_text).await?;
    info!(
        "Extracted {} completed course codes for {owner}",
        completed.len()
    );

    // Phase B
    let catalog = store.list_all_courses().await?;
    let candidates = filter_candidates(catalog, &completed);

    // Phase C
    if candidates.is_empty() {
        info!("No candidate courses left for {owner}; skipping recommendation call");
        return Ok(RecommendationOutcome {
            id: None,
            created_at: None,
            courses: Vec::new(),
            scholarships: Vec::new(),
            message: Some(NO_CANDIDATES_MESSAGE.to_string()),
            user_pref: request.preference,
            analyzed_at: Utc::now(),
        });
    }

    // Phase D
    let messages = vec![
        ChatMessage::system(
            RECOMMENDATION_SYSTEM_TEMPLATE
                .replace("{match_scale}", MATCH_SCALE_INSTRUCTION)
                .replace("{json_only}", JSON_ONLY_INSTRUCTION),
        ),
        ChatMessage::user(build_recommendation_prompt(&candidates, &request.preference)?),
    ];
    let raw = llm.complete(&messages, true).await?;
    let selection = parse_selection(&raw);
    if selection.is_empty() {
        warn!("Recommendation reply contained no usable selections for {owner}");
    }

    // Phase E
    let courses = enrich_selection(selection, &candidates);

    // Phase F
    let scholarships = match store
        .list_recent_scholarships(owner, MERGED_SCHOLARSHIP_LIMIT)
        .await
    {
        Ok(rows) => rows,
        Err(e) => {
            warn!("Failed to list scholarships for payload merge: {e}");
            Vec::new()
        }
    };

    let payload = RecommendationPayload::new(courses, &scholarships)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to build payload: {e}")))?;
    let encoded = payload
        .encode()
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to encode payload: {e}")))?;

    let record = store
        .create_recommendation(NewRecommendation {
            owner: owner.to_string(),
            transcript_id: Some(transcript.id),
            payload: encoded,
            summary: Some(RECORD_SUMMARY.to_string()),
        })
        .await?;

    info!(
        "Stored recommendation {} with {} courses for {owner}",
        record.id,
        payload.courses.len()
    );

    Ok(RecommendationOutcome {
        id: Some(record.id),
        created_at: Some(record.created_at),
        courses: payload.courses,
        scholarships,
        message: None,
        user_pref: request.preference,
        analyzed_at: Utc::now(),
    })
}

/// Phase A. A reply that is not the expected JSON counts as "nothing
/// completed"; only a failed call is an error.
async fn extract_completed_codes(
    llm: &LlmClient,
    transcript_text: &str,
) -> Result<HashSet<String>, LlmError> {
    let messages = vec![
        ChatMessage::system(EXTRACTION_SYSTEM),
        ChatMessage::user(transcript_text),
    ];
    let raw = llm.complete(&messages, true).await?;

    let extracted = parse_json_reply::<CompletedCodes>(&raw).unwrap_or_else(|e| {
        warn!("Could not decode completed course codes, assuming none: {e}");
        CompletedCodes::default()
    });

    Ok(normalize_codes(extracted.completed_codes))
}

fn normalize_codes(codes: Vec<String>) -> HashSet<String> {
    codes
        .iter()
        .map(|c| normalize_code(c))
        .filter(|c| !c.is_empty())
        .collect()
}

/// Phase B: the catalog minus everything already completed.
fn filter_candidates(catalog: Vec<CourseRow>, completed: &HashSet<String>) -> Vec<CourseRow> {
    catalog
        .into_iter()
        .filter(|c| !completed.contains(&c.normalized_code()))
        .collect()
}

fn build_recommendation_prompt(
    candidates: &[CourseRow],
    preference: &str,
) -> Result<String, AppError> {
    let compact: Vec<PromptCourse<'_>> = candidates
        .iter()
        .map(|c| PromptCourse {
            id: c.id,
            code: &c.code,
            name: &c.name,
            desc: c
                .learning_outcomes
                .as_deref()
                .map(|d| truncate_chars(d, CANDIDATE_DESCRIPTION_CHARS, "..."))
                .unwrap_or_default(),
        })
        .collect();
    let candidates_json = serde_json::to_string(&compact)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize candidates: {e}")))?;

    let preference = match preference.trim() {
        "" => NO_PREFERENCE,
        p => p,
    };

    Ok(RECOMMENDATION_PROMPT_TEMPLATE
        .replace("{preference}", preference)
        .replace("{candidates_json}", &candidates_json))
}

/// Phase D parsing: `{"recommendations": [...]}` first, then a bare array.
pub fn parse_selection(raw: &str) -> Vec<SelectedCourse> {
    if let Ok(envelope) = parse_json_reply::<SelectionEnvelope>(raw) {
        return envelope.recommendations;
    }
    parse_json_reply::<Vec<SelectedCourse>>(raw).unwrap_or_default()
}

/// Phase E: attach catalog links, keep the first pick per course, order by
/// match (ties keep the model's order) and cap the list.
pub fn enrich_selection(
    selection: Vec<SelectedCourse>,
    candidates: &[CourseRow],
) -> Vec<CourseRecommendation> {
    let links: HashMap<i64, &str> = candidates
        .iter()
        .map(|c| (c.id, c.course_link.as_deref().unwrap_or("")))
        .collect();

    let mut seen = HashSet::new();
    let mut courses: Vec<CourseRecommendation> = selection
        .into_iter()
        .filter(|s| seen.insert(s.course_id))
        .map(|s| CourseRecommendation {
            kind: COURSE_KIND.to_string(),
            link: links.get(&s.course_id).copied().unwrap_or("").to_string(),
            title: s.title,
            description: s.rationale,
            match_score: s.match_score,
            code: s.code,
            course_id: s.course_id,
        })
        .collect();

    // sort_by is stable.
    courses.sort_by(|a, b| b.match_score.total_cmp(&a.match_score));
    courses.truncate(MAX_RECOMMENDATIONS);
    courses
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
