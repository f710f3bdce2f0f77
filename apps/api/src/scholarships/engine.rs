//! Scholarship Engine: Search-grounded scholarship suggestions.
//!
//! Flow: latest transcript → web search (best effort) → prompt → JSON-mode
//!       call → tiered parse → sanitize, dedup, sort → persist row by row.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::grounding::{SearchClient, WebResult};
use crate::llm_client::{ChatMessage, LlmClient};
use crate::models::scholarship::NewScholarship;
use crate::scholarships::parsing::{parse_scholarships, ScholarshipRecommendation};
use crate::scholarships::prompts::{SCHOLARSHIP_BRIEF, SCHOLARSHIP_SYSTEM, WEB_RESULTS_HEADING};
use crate::store::{latest_transcript, Store};
use crate::text::{title_key, truncate_chars};

const RESULT_TITLE_CHARS: usize = 100;
const RESULT_SNIPPET_CHARS: usize = 200;
const TRUNCATION_SUFFIX: &str = "...(truncated)";

/// What to ask the search API for.
#[derive(Debug, Clone)]
pub struct GroundingQuery {
    pub query: String,
    pub max_results: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScholarshipBatch {
    pub user: String,
    pub count: usize,
    pub scholarships: Vec<ScholarshipRecommendation>,
    pub generated_at: DateTime<Utc>,
}

pub async fn generate_scholarships(
    store: &dyn Store,
    llm: &LlmClient,
    search: &SearchClient,
    grounding: &GroundingQuery,
    owner: &str,
) -> Result<ScholarshipBatch, AppError> {
    let transcript = latest_transcript(store, owner)
        .await?
        .ok_or_else(|| AppError::NotFound("No transcripts found".to_string()))?;
    let transcript_text = transcript.usable_text().ok_or_else(|| {
        AppError::Validation("Transcript has no extracted text".to_string())
    })?;

    let web_results = match search.search(&grounding.query, grounding.max_results).await {
        Ok(results) => results,
        Err(e) => {
            warn!("Web search failed, continuing with transcript only: {e}");
            Vec::new()
        }
    };
    info!("Grounding scholarship prompt with {} web results", web_results.len());

    let messages = vec![
        ChatMessage::system(SCHOLARSHIP_SYSTEM),
        ChatMessage::user(build_prompt(transcript_text, &web_results)),
    ];
    let raw = llm.complete(&messages, true).await?;

    let scholarships = rank(sanitize(parse_scholarships(&raw)));
    if scholarships.is_empty() {
        warn!("Scholarship reply for {owner} yielded no usable items");
    }

    let mut saved = 0usize;
    for item in &scholarships {
        match store.create_scholarship(to_new_row(owner, item)).await {
            Ok(_) => saved += 1,
            Err(e) => warn!("Failed to save scholarship '{}': {e}", item.title),
        }
    }
    info!(
        "Generated {} scholarships for {owner} ({saved} saved)",
        scholarships.len()
    );

    Ok(ScholarshipBatch {
        user: owner.to_string(),
        count: scholarships.len(),
        scholarships,
        generated_at: Utc::now(),
    })
}

fn build_prompt(transcript_text: &str, web_results: &[WebResult]) -> String {
    let mut prompt = String::from(SCHOLARSHIP_BRIEF);
    prompt.push_str("Transcript:\n\"\"\"\n");
    prompt.push_str(transcript_text);
    prompt.push_str("\n\"\"\"\n\n");

    if !web_results.is_empty() {
        prompt.push_str(WEB_RESULTS_HEADING);
        prompt.push('\n');
        for result in web_results {
            prompt.push_str(&format!(
                "- {}\n  Link: {}\n  About: {}\n",
                truncate_chars(&result.title, RESULT_TITLE_CHARS, TRUNCATION_SUFFIX),
                result.url,
                truncate_chars(&result.snippet, RESULT_SNIPPET_CHARS, TRUNCATION_SUFFIX),
            ));
        }
    }
    prompt
}

/// Trims every field and drops items without a title or a link.
fn sanitize(items: Vec<ScholarshipRecommendation>) -> Vec<ScholarshipRecommendation> {
    items
        .into_iter()
        .map(|item| ScholarshipRecommendation {
            title: item.title.trim().to_string(),
            description: item.description.trim().to_string(),
            match_score: item.match_score,
            link: item.link.trim().to_string(),
        })
        .filter(|item| !item.title.is_empty() && !item.link.is_empty())
        .collect()
}

/// First item per case-insensitive title wins; then match descending, ties in
/// reply order.
fn rank(items: Vec<ScholarshipRecommendation>) -> Vec<ScholarshipRecommendation> {
    let mut seen = HashSet::new();
    let mut items: Vec<_> = items
        .into_iter()
        .filter(|item| seen.insert(title_key(&item.title)))
        .collect();
    items.sort_by(|a, b| b.match_score.total_cmp(&a.match_score));
    items
}

fn to_new_row(owner: &str, item: &ScholarshipRecommendation) -> NewScholarship {
    NewScholarship {
        owner: owner.to_string(),
        title: item.title.clone(),
        description: Some(item.description.clone()).filter(|d| !d.is_empty()),
        match_score: Some(item.match_score).filter(|m| *m > 0.0),
        link: Some(item.link.clone()),
    }
}
