// All LLM prompt constants for the recommendation engine.
// Reuses cross-cutting fragments from llm_client::prompts.

/// Phase A: pull completed course codes out of a transcript.
pub const EXTRACTION_SYSTEM: &str = "You are a data extraction assistant. \
    Analyze the academic transcript and return a JSON object with a single key \
    'completed_codes' containing a list of strings. Each string must be a Course Code \
    (e.g. 'CS101') the student has completed.";

/// Phase D system prompt. `{json_only}` and `{match_scale}` are filled from
/// the shared fragments.
pub const RECOMMENDATION_SYSTEM_TEMPLATE: &str = r#"You are an academic course advisor.
Task:
1. Analyze the 'Available Courses' list and the 'User Preference'.
2. Select the top 3-5 courses that best match the preference.
3. Return a JSON object with a key "recommendations" which is an array.
4. Each item must have:
   - "course_id" (integer, copied exactly from input)
   - "code" (string)
   - "title" (string)
   - "rationale" (string, why it fits)
   - "match" (number 0-100)
{match_scale}
{json_only}"#;

/// Phase D user prompt. Replace `{preference}` and `{candidates_json}`.
pub const RECOMMENDATION_PROMPT_TEMPLATE: &str = "User Preference: {preference}

Available Courses:
{candidates_json}";

/// Substituted when the student did not state a preference.
pub const NO_PREFERENCE: &str = "(none stated; pick the strongest next steps for this student)";
