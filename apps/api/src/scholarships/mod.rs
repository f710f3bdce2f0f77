// Scholarship suggestions grounded in live web search results.
// Search failures degrade to transcript-only prompting; inference failures abort.

pub mod engine;
pub mod handlers;
pub mod parsing;
pub mod prompts;
