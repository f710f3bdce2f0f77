// Course recommendations: two-phase generation (extract completed courses,
// then recommend new ones), listing/reading records, and course removal.
// All LLM calls go through llm_client.

pub mod engine;
pub mod handlers;
pub mod payload;
pub mod prompts;
pub mod records;
