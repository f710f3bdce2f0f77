//! Context Assembler: Builds the system message for one chat turn.
//!
//! The persona is always present. A referenced recommendation the caller owns
//! contributes its transcript text and payload; the caller's recent
//! scholarships are listed last. Every lookup failure degrades to leaving its
//! section out.

use std::collections::{BTreeMap, HashSet};

use serde::de::IgnoredAny;
use serde::Deserialize;
use serde_json::value::RawValue;
use tracing::{debug, info, warn};

use crate::chat::prompts::{
    ADVISOR_PERSONA, COURSES_MARKER, FULL_CONTEXT_MARKER, OTHER_DATA_MARKER,
    RAW_PAYLOAD_MARKER, SCHOLARSHIPS_HEADING, SCHOLARSHIPS_USAGE, TRANSCRIPT_MARKER,
};
use crate::errors::AppError;
use crate::llm_client::{ChatMessage, Role};
use crate::models::recommendation::RecommendationRow;
use crate::models::scholarship::ScholarshipRow;
use crate::store::Store;
use crate::text::{title_key, truncate_chars};

/// Request header naming the recommendation the conversation is about.
pub const RECOMMENDATION_HEADER: &str = "x-recommendation-id";

const SCHOLARSHIP_LIMIT: i64 = 10;
const SCHOLARSHIP_DESCRIPTION_CHARS: usize = 200;

/// Payload keys that are not re-injected as "other data". `scholarships` is
/// replaced by the fresh list from the store.
const HANDLED_PAYLOAD_KEYS: [&str; 3] = ["courses", "scholarships", "schema_version"];

/// One message as the client sends it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IncomingMessage {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: String,
}

/// Normalizes client messages: roles coerced, content trimmed, blanks dropped.
pub fn prepare_messages(incoming: Vec<IncomingMessage>) -> Result<Vec<ChatMessage>, AppError> {
    let messages: Vec<ChatMessage> = incoming
        .into_iter()
        .filter_map(|m| {
            let content = m.content.trim();
            (!content.is_empty()).then(|| ChatMessage {
                role: Role::coerce(&m.role),
                content: content.to_string(),
            })
        })
        .collect();

    if messages.is_empty() {
        return Err(AppError::Validation(
            "messages must contain at least one non-empty message".to_string(),
        ));
    }
    Ok(messages)
}

pub async fn assemble_context(
    store: &dyn Store,
    owner: &str,
    recommendation_ref: Option<&str>,
) -> String {
    let mut context = ADVISOR_PERSONA.to_string();

    if let Some(record) = resolve_recommendation(store, owner, recommendation_ref).await {
        let injected = recommendation_context(store, owner, &record).await;
        if !injected.is_empty() {
            info!(
                "Injecting {} bytes of context for recommendation {}",
                injected.len(),
                record.id
            );
            context.push_str("\n\n");
            context.push_str(FULL_CONTEXT_MARKER);
            context.push('\n');
            context.push_str(&injected);
        }
    }

    match store.list_recent_scholarships(owner, SCHOLARSHIP_LIMIT).await {
        Ok(rows) => context.push_str(&scholarship_section(rows)),
        Err(e) => warn!("Failed to fetch scholarships for chat context: {e}"),
    }

    context
}

async fn resolve_recommendation(
    store: &dyn Store,
    owner: &str,
    recommendation_ref: Option<&str>,
) -> Option<RecommendationRow> {
    let raw = recommendation_ref?.trim();
    if raw.is_empty() {
        return None;
    }
    let Ok(id) = raw.parse::<i64>() else {
        debug!("Ignoring non-numeric recommendation reference: {raw}");
        return None;
    };

    match store.get_recommendation(id).await {
        Ok(Some(record)) if record.owner == owner => Some(record),
        Ok(_) => {
            warn!("Recommendation {id} not found for {owner}; chatting without it");
            None
        }
        Err(e) => {
            warn!("Failed to fetch recommendation {id}: {e}");
            None
        }
    }
}

async fn recommendation_context(
    store: &dyn Store,
    owner: &str,
    record: &RecommendationRow,
) -> String {
    let mut injected = String::new();

    if let Some(transcript_id) = record.transcript_id {
        match store.get_transcript(transcript_id).await {
            Ok(Some(transcript)) if transcript.owner == owner => {
                if let Some(text) = transcript.usable_text() {
                    push_section(&mut injected, TRANSCRIPT_MARKER, text);
                }
            }
            Ok(_) => debug!("Transcript {transcript_id} unavailable for chat context"),
            Err(e) => warn!("Failed to fetch transcript {transcript_id}: {e}"),
        }
    }

    let payload = record.payload.trim();
    if payload.is_empty() {
        return injected;
    }

    match serde_json::from_str::<BTreeMap<String, Box<RawValue>>>(payload) {
        Ok(mut fields) => {
            if let Some(courses) = fields.get("courses").filter(|c| has_content(c)) {
                push_section(&mut injected, COURSES_MARKER, courses.get());
            }
            for key in HANDLED_PAYLOAD_KEYS {
                fields.remove(key);
            }
            if !fields.is_empty() {
                match serde_json::to_string(&fields) {
                    Ok(other) => push_section(&mut injected, OTHER_DATA_MARKER, &other),
                    Err(e) => warn!("Failed to re-encode recommendation data: {e}"),
                }
            }
        }
        Err(_) => push_section(&mut injected, RAW_PAYLOAD_MARKER, payload),
    }

    injected
}

/// An array counts when it has items; anything else when it is not null.
fn has_content(value: &RawValue) -> bool {
    match serde_json::from_str::<Vec<IgnoredAny>>(value.get()) {
        Ok(items) => !items.is_empty(),
        Err(_) => value.get() != "null",
    }
}

fn push_section(out: &mut String, marker: &str, body: &str) {
    out.push_str("\n\n");
    out.push_str(marker);
    out.push('\n');
    out.push_str(body);
    out.push('\n');
}

/// Numbered scholarship list, one entry per distinct title. Empty when there
/// is nothing to list.
fn scholarship_section(rows: Vec<ScholarshipRow>) -> String {
    let mut seen = HashSet::new();
    let rows: Vec<ScholarshipRow> = rows
        .into_iter()
        .filter(|r| seen.insert(title_key(&r.title)))
        .collect();
    if rows.is_empty() {
        return String::new();
    }

    let mut section = format!("\n\n{SCHOLARSHIPS_HEADING}\n{SCHOLARSHIPS_USAGE}\n\n");
    for (i, row) in rows.iter().enumerate() {
        section.push_str(&format!(
            "{}. {} (Match: {:.0}%)\n",
            i + 1,
            row.title,
            row.match_score.unwrap_or(0.0)
        ));
        if let Some(description) = row.description.as_deref().filter(|d| !d.is_empty()) {
            section.push_str(&format!(
                "   Context: {}\n",
                truncate_chars(description, SCHOLARSHIP_DESCRIPTION_CHARS, "...")
            ));
        }
        if let Some(link) = row.link.as_deref().filter(|l| !l.is_empty()) {
            section.push_str(&format!("   Link: {link}\n"));
        }
        section.push('\n');
    }

    info!("Injected {} scholarships into chat context", rows.len());
    section
}
