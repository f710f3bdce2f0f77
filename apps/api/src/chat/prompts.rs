// Prompt text and section markers for the chat context.

/// Base system instruction for every conversational turn.
pub const ADVISOR_PERSONA: &str = "You are EduSphere AI, an academic advisor who provides \
personalized advice based on the provided user's full academic context (transcript, \
recommended courses, and potential scholarships). Be concise and professional. You must use \
the provided context to justify your answers.";

pub const FULL_CONTEXT_MARKER: &str = "[FULL ACADEMIC CONTEXT INJECTED BELOW]";
pub const TRANSCRIPT_MARKER: &str = "[USER ACADEMIC TRANSCRIPT TEXT]";
pub const COURSES_MARKER: &str = "[RECOMMENDED COURSES JSON]";
pub const OTHER_DATA_MARKER: &str = "[OTHER RECOMMENDATION DATA JSON]";
pub const RAW_PAYLOAD_MARKER: &str = "[RAW RECOMMENDATION PAYLOAD JSON]";

pub const SCHOLARSHIPS_HEADING: &str =
    "=== AVAILABLE SCHOLARSHIP OPPORTUNITIES (FROM DATABASE) ===";
pub const SCHOLARSHIPS_USAGE: &str =
    "Use this list if the user asks about financial aid, funding, or scholarships.";
