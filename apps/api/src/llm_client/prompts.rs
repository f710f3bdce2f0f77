// Shared prompt fragments.
// Each engine that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting fragments only.

/// Appended to system prompts that must produce machine-readable output.
pub const JSON_ONLY_INSTRUCTION: &str = "Respond with valid JSON only. \
    Do NOT include markdown, code fences, or commentary. \
    Do NOT include explanations or apologies.";

/// Instruction defining the 0-100 scale used for every match score.
pub const MATCH_SCALE_INSTRUCTION: &str = "\"match\" is a number from 0 to 100 \
    where 100 means a perfect fit for this student.";
