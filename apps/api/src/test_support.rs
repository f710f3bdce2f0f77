//! Helpers shared by the unit tests: clients pointed at wiremock servers and
//! canned inference responses.

use serde_json::{json, Value};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::grounding::{SearchClient, SearchSettings};
use crate::llm_client::{LlmClient, LlmSettings};

pub fn llm_client_for(server: &MockServer) -> LlmClient {
    LlmClient::new(LlmSettings {
        api_key: "test-key".to_string(),
        base_url: server.uri(),
        model: "gpt-4o-mini".to_string(),
    })
}

pub fn search_client_for(server: &MockServer) -> SearchClient {
    SearchClient::new(SearchSettings {
        enabled: true,
        api_key: "brave-key".to_string(),
        base_url: format!("{}/res/v1/web/search", server.uri()),
    })
}

/// A non-streaming chat completion whose single choice carries `content`.
pub fn chat_completion_body(content: &str) -> Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
}

/// Answers completion requests whose body contains `marker` with `content`,
/// and fails the test on drop unless exactly `times` such requests arrived.
pub async fn mount_completion(server: &MockServer, marker: &str, content: &str, times: u64) {
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains(marker))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_completion_body(content)))
        .expect(times)
        .mount(server)
        .await;
}

/// Fails the test if any completion request reaches the server.
pub async fn forbid_completions(server: &MockServer) {
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(server)
        .await;
}

/// Bodies of all completion requests received so far, in arrival order.
pub async fn completion_bodies(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.url.path() == "/chat/completions")
        .map(|r| String::from_utf8_lossy(&r.body).into_owned())
        .collect()
}
