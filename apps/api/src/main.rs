mod auth;
mod chat;
mod config;
mod db;
mod errors;
mod grounding;
mod llm_client;
mod models;
mod recommendations;
mod routes;
mod scholarships;
mod state;
mod store;
mod summary;
mod text;

#[cfg(test)]
mod test_support;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::grounding::{SearchClient, SearchSettings};
use crate::llm_client::{LlmClient, LlmSettings};
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::postgres::PgStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting EduSphere API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    let store = Arc::new(PgStore::new(db));

    // Initialize upstream clients
    let llm = LlmClient::new(LlmSettings {
        api_key: config.openai_api_key.clone(),
        base_url: config.openai_base_url.clone(),
        model: config.openai_model.clone(),
    });
    info!("LLM client initialized (model: {})", llm.model());
    if config.openai_api_key.is_empty() {
        warn!("OPENAI_API_KEY is not set; inference calls will fail");
    }

    let search = SearchClient::new(SearchSettings {
        enabled: config.web_search_enabled,
        api_key: config.brave_api_key.clone(),
        base_url: config.brave_api_url.clone(),
    });
    info!(
        "Search client initialized (enabled: {}, max results: {})",
        config.web_search_enabled, config.web_search_max_results
    );

    // Build app state
    let state = AppState {
        store,
        llm,
        search,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        // TODO: restrict origins once the web client's domain is fixed
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
