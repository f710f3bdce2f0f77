// Conversational turns: per-request context assembly and the token relay that
// streams the upstream completion back to the client.

pub mod context;
pub mod handlers;
pub mod prompts;
pub mod relay;
