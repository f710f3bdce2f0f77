pub mod health;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::state::AppState;
use crate::{chat, grounding, recommendations, scholarships, summary};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Recommendations
        .route(
            "/api/v1/recommendations",
            post(recommendations::handlers::handle_generate)
                .get(recommendations::handlers::handle_list),
        )
        .route(
            "/api/v1/recommendations/:id",
            get(recommendations::handlers::handle_get),
        )
        .route(
            "/api/v1/recommendations/:reco_id/courses/:course_id",
            delete(recommendations::handlers::handle_delete_course),
        )
        // Scholarships and summaries
        .route(
            "/api/v1/scholarships/generate",
            post(scholarships::handlers::handle_generate),
        )
        .route(
            "/api/v1/summaries/generate",
            post(summary::handlers::handle_generate),
        )
        // Chat
        .route("/api/v1/chat/stream", post(chat::handlers::handle_chat_stream))
        // Web search proxy (no caller identity required)
        .route(
            "/api/v1/websearch",
            get(grounding::handlers::handle_web_search),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::auth::OWNER_HEADER;
    use crate::config::Config;
    use crate::store::memory::MemoryStore;
    use crate::test_support::{forbid_completions, llm_client_for, search_client_for};

    fn test_config() -> Config {
        Config {
            database_url: "postgres://unused".to_string(),
            openai_api_key: "test-key".to_string(),
            openai_model: "gpt-4o-mini".to_string(),
            openai_base_url: "http://unused".to_string(),
            brave_api_key: "brave-key".to_string(),
            brave_api_url: "http://unused".to_string(),
            web_search_enabled: true,
            web_search_max_results: 2,
            scholarship_search_query: "ai scholarships".to_string(),
            port: 0,
            rust_log: "info".to_string(),
        }
    }

    fn app(store: Arc<MemoryStore>, server: &MockServer) -> Router {
        build_router(AppState {
            store,
            llm: llm_client_for(server),
            search: search_client_for(server),
            config: test_config(),
        })
    }

    fn request(method: &str, uri: &str, owner: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(owner) = owner {
            builder = builder.header(OWNER_HEADER, owner);
        }
        match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let server = MockServer::start().await;
        let response = app(Arc::new(MemoryStore::new()), &server)
            .oneshot(request("GET", "/health", None, None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_missing_identity_is_unauthorized() {
        let server = MockServer::start().await;
        let response = app(Arc::new(MemoryStore::new()), &server)
            .oneshot(request("GET", "/api/v1/recommendations", Some("  "), None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await["error"]["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_list_and_get_are_owner_scoped() {
        let server = MockServer::start().await;
        let store = Arc::new(MemoryStore::new());
        let id = store.add_recommendation("alice", None, r#"{"courses":[]}"#);
        let app = app(store, &server);

        let listed = app
            .clone()
            .oneshot(request("GET", "/api/v1/recommendations", Some("alice"), None))
            .await
            .unwrap();
        assert_eq!(listed.status(), StatusCode::OK);
        assert_eq!(json_body(listed).await["recommendations"][0]["id"], id);

        let foreign = app
            .oneshot(request("GET", &format!("/api/v1/recommendations/{id}"), Some("bob"), None))
            .await
            .unwrap();
        assert_eq!(foreign.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(foreign).await["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_delete_course_returns_remaining_courses() {
        let server = MockServer::start().await;
        let store = Arc::new(MemoryStore::new());
        let id = store.add_recommendation(
            "alice",
            None,
            r#"{"courses":[{"course_id":1,"title":"A"},{"course_id":2,"title":"B"}]}"#,
        );

        let response = app(store.clone(), &server)
            .oneshot(request(
                "DELETE",
                &format!("/api/v1/recommendations/{id}/courses/1"),
                Some("alice"),
                None,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["message"], "Course deleted.");
        assert_eq!(body["courses"].as_array().unwrap().len(), 1);
        assert_eq!(body["courses"][0]["course_id"], 2);
        assert!(!store.payload_of(id).unwrap().contains(r#""course_id":1"#));
    }

    #[tokio::test]
    async fn test_generate_rejects_invalid_transcript_id() {
        let server = MockServer::start().await;
        forbid_completions(&server).await;

        let response = app(Arc::new(MemoryStore::new()), &server)
            .oneshot(request(
                "POST",
                "/api/v1/recommendations",
                Some("alice"),
                Some(json!({"transcript_id": 0, "preference": "ai"})),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_chat_with_no_messages_fails_before_streaming() {
        let server = MockServer::start().await;
        forbid_completions(&server).await;

        let response = app(Arc::new(MemoryStore::new()), &server)
            .oneshot(request(
                "POST",
                "/api/v1/chat/stream",
                Some("alice"),
                Some(json!({"messages": []})),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_chat_streams_event_frames() {
        let server = MockServer::start().await;
        let chunk = json!({"choices": [{"delta": {"content": "Hi"}}]});
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                format!("data: {chunk}\n\ndata: [DONE]\n\n"),
                "text/event-stream",
            ))
            .expect(1)
            .mount(&server)
            .await;

        let response = app(Arc::new(MemoryStore::new()), &server)
            .oneshot(request(
                "POST",
                "/api/v1/chat/stream",
                Some("alice"),
                Some(json!({"messages": [{"role": "user", "content": "hello"}]})),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/event-stream"
        );
        assert_eq!(response.headers()[header::CACHE_CONTROL], "no-cache");
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"data: Hi\n\ndata: [DONE]\n\n");
    }

    #[tokio::test]
    async fn test_websearch_proxy() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("q", "rust grants"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "web": {"results": [
                    {"title": "A", "url": "https://a.org", "description": "a"},
                    {"title": "B", "url": "https://b.org", "description": "b"},
                    {"title": "C", "url": "https://c.org", "description": "c"}
                ]}
            })))
            .mount(&server)
            .await;
        let app = app(Arc::new(MemoryStore::new()), &server);

        let response = app
            .clone()
            .oneshot(request("GET", "/api/v1/websearch?q=rust%20grants", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await.as_array().unwrap().len(), 2);

        let missing = app
            .oneshot(request("GET", "/api/v1/websearch?q=%20", None, None))
            .await
            .unwrap();
        assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_websearch_upstream_failure_is_bad_gateway() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let response = app(Arc::new(MemoryStore::new()), &server)
            .oneshot(request("GET", "/api/v1/websearch?q=grants", None, None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(json_body(response).await["error"]["code"], "SEARCH_ERROR");
    }
}
