// All LLM prompt constants for the scholarship engine.

/// System prompt. Pins the reply to an array or a `scholarships` wrapper.
pub const SCHOLARSHIP_SYSTEM: &str = r#"You are a strict JSON generator.
Always return either a JSON array or a JSON object containing "scholarships": [ ... ].
Do not include markdown, code fences, or commentary.

Each scholarship must contain:
- "title": string
- "description": string
- "match": number (0-100)
- "link": string (valid URL)"#;

/// User prompt preamble. The transcript and web results are appended after it.
pub const SCHOLARSHIP_BRIEF: &str = "You are an academic scholarship advisor.
Your task: identify scholarships, NOT university courses or degrees.
Use the student's transcript only to understand their background (e.g. Software Engineering, AI, Data Science).
From the provided web search results, list the most relevant scholarships for this profile.

Return ONLY scholarships (no courses, no degrees, no projects).
Each result must include:
- title (scholarship name)
- description (what it offers or who it's for)
- match (number 0-100)
- link (URL to the scholarship)

Respond ONLY in valid JSON format.
";

pub const WEB_RESULTS_HEADING: &str = "Scholarship Web Results:";
