use std::sync::Arc;

use crate::config::Config;
use crate::grounding::SearchClient;
use crate::llm_client::LlmClient;
use crate::store::Store;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Persistence. `PgStore` in production, swapped for an in-memory store in tests.
    pub store: Arc<dyn Store>,
    pub llm: LlmClient,
    pub search: SearchClient,
    pub config: Config,
}
