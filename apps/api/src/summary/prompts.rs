// All LLM prompt constants for the transcript summary.

pub const SUMMARY_SYSTEM: &str =
    "You are an academic summarizer. Return only plain text summary, no markdown.";

/// Replace `{transcript}`.
pub const SUMMARY_PROMPT_TEMPLATE: &str = r#"Summarize the student's transcript below into 3 concise paragraphs.
Focus on academic strengths, software engineering skills, and AI or data science potential.

Transcript:
"""{transcript}""""#;
