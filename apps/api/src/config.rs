use anyhow::{Context, Result};

const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_BRAVE_API_URL: &str = "https://api.search.brave.com/res/v1/web/search";
const DEFAULT_SCHOLARSHIP_QUERY: &str =
    "scholarships for international students studying computer science OR artificial intelligence";

/// Application configuration loaded from environment variables.
/// Only `DATABASE_URL` is required at startup. Upstream credentials may be
/// absent; the clients report a missing credential when they are first used.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub openai_api_key: String,
    pub openai_model: String,
    pub openai_base_url: String,
    pub brave_api_key: String,
    pub brave_api_url: String,
    pub web_search_enabled: bool,
    pub web_search_max_results: usize,
    pub scholarship_search_query: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            openai_api_key: optional_env("OPENAI_API_KEY").unwrap_or_default(),
            openai_model: optional_env("OPENAI_MODEL")
                .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            openai_base_url: optional_env("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            brave_api_key: optional_env("BRAVE_API_KEY").unwrap_or_default(),
            brave_api_url: optional_env("BRAVE_API_URL")
                .unwrap_or_else(|| DEFAULT_BRAVE_API_URL.to_string()),
            web_search_enabled: optional_env("WEB_SEARCH_ENABLED")
                .map(|v| parse_bool(&v))
                .transpose()?
                .unwrap_or(true),
            web_search_max_results: optional_env("WEB_SEARCH_MAX_RESULTS")
                .map(|v| v.parse::<usize>())
                .transpose()
                .context("WEB_SEARCH_MAX_RESULTS must be a non-negative integer")?
                .unwrap_or(5),
            scholarship_search_query: optional_env("SCHOLARSHIP_SEARCH_QUERY")
                .unwrap_or_else(|| DEFAULT_SCHOLARSHIP_QUERY.to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Returns the variable's trimmed value, treating blank values as unset.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_bool(raw: &str) -> Result<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("expected a boolean value, got '{other}'"),
    }
}
