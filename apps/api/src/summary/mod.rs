//! Summary Generator: A plain-text overview of the owner's latest transcript.
//! The result is returned to the caller and not stored.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::llm_client::{ChatMessage, LlmClient};
use crate::store::{latest_transcript, Store};

pub mod handlers;
pub mod prompts;

use prompts::{SUMMARY_PROMPT_TEMPLATE, SUMMARY_SYSTEM};

#[derive(Debug, Clone, Serialize)]
pub struct TranscriptSummary {
    pub user: String,
    pub summary_text: String,
    pub generated_at: DateTime<Utc>,
}

pub async fn generate_summary(
    store: &dyn Store,
    llm: &LlmClient,
    owner: &str,
) -> Result<TranscriptSummary, AppError> {
    let transcript = latest_transcript(store, owner)
        .await?
        .ok_or_else(|| AppError::NotFound("No transcripts found".to_string()))?;
    let text = transcript.usable_text().ok_or_else(|| {
        AppError::Validation("Transcript has no extracted text".to_string())
    })?;

    let messages = vec![
        ChatMessage::system(SUMMARY_SYSTEM),
        ChatMessage::user(SUMMARY_PROMPT_TEMPLATE.replace("{transcript}", text)),
    ];
    let summary_text = llm.complete(&messages, false).await?.trim().to_string();

    info!(
        "Summarized transcript {} for {owner} ({} chars)",
        transcript.id,
        summary_text.len()
    );

    Ok(TranscriptSummary {
        user: owner.to_string(),
        summary_text,
        generated_at: Utc::now(),
    })
}
