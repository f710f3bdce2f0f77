//! Web search used to ground scholarship suggestions in real sources.
//!
//! Talks to a Brave-compatible search API. Results are normalised to
//! `{title, url, snippet}` and capped, preserving upstream order.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::text::truncate_chars;

pub mod handlers;

const SEARCH_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("web search is disabled")]
    Disabled,

    #[error("search API key is not configured")]
    MissingCredential,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("search API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("invalid search response: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

#[derive(Debug, Default, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    web: WebSection,
}

#[derive(Debug, Default, Deserialize)]
struct WebSection {
    #[serde(default)]
    results: Vec<RawResult>,
}

#[derive(Debug, Deserialize)]
struct RawResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Clone)]
pub struct SearchSettings {
    pub enabled: bool,
    pub api_key: String,
    pub base_url: String,
}

#[derive(Clone)]
pub struct SearchClient {
    client: Client,
    settings: SearchSettings,
}

impl SearchClient {
    pub fn new(settings: SearchSettings) -> Self {
        Self {
            client: Client::builder()
                .timeout(SEARCH_TIMEOUT)
                .build()
                .expect("Failed to build HTTP client"),
            settings,
        }
    }

    /// Runs `query` and returns at most `max_results` items (`0` = no cap).
    /// An empty result set is a normal outcome, not an error.
    pub async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<WebResult>, SearchError> {
        if !self.settings.enabled {
            return Err(SearchError::Disabled);
        }
        if self.settings.api_key.trim().is_empty() {
            return Err(SearchError::MissingCredential);
        }

        debug!("Web search: {query}");

        let response = self
            .client
            .get(&self.settings.base_url)
            .query(&[("q", query)])
            .header("Accept", "application/json")
            .header("X-Subscription-Token", &self.settings.api_key)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(SearchError::Api {
                status: status.as_u16(),
                message: truncate_chars(&body, 300, ""),
            });
        }

        let parsed: SearchResponse = serde_json::from_str(&body)?;
        let limit = if max_results == 0 {
            usize::MAX
        } else {
            max_results
        };

        let results: Vec<WebResult> = parsed
            .web
            .results
            .into_iter()
            .take(limit)
            .map(|r| WebResult {
                title: r.title.trim().to_string(),
                url: r.url.trim().to_string(),
                snippet: r.description.trim().to_string(),
            })
            .collect();

        if results.is_empty() {
            info!("Web search returned no results for query: {query}");
        }

        Ok(results)
    }
}
