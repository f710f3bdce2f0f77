//! Axum route handler for the Chat API.

use std::convert::Infallible;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
    Json,
};
use futures_util::StreamExt;
use serde::Deserialize;

use crate::auth::Owner;
use crate::chat::context::{
    assemble_context, prepare_messages, IncomingMessage, RECOMMENDATION_HEADER,
};
use crate::chat::relay::spawn_relay;
use crate::errors::AppError;
use crate::llm_client::ChatMessage;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatStreamRequest {
    #[serde(default)]
    pub messages: Vec<IncomingMessage>,
}

/// POST /api/v1/chat/stream
///
/// Validation happens before the stream opens. Once it is open, every failure
/// is reported in-band as an error event followed by `[DONE]`.
pub async fn handle_chat_stream(
    State(state): State<AppState>,
    owner: Owner,
    headers: HeaderMap,
    Json(request): Json<ChatStreamRequest>,
) -> Result<Response, AppError> {
    let conversation = prepare_messages(request.messages)?;

    let recommendation_ref = headers
        .get(RECOMMENDATION_HEADER)
        .and_then(|v| v.to_str().ok());
    let system = assemble_context(state.store.as_ref(), owner.as_str(), recommendation_ref).await;

    let mut messages = Vec::with_capacity(conversation.len() + 1);
    messages.push(ChatMessage::system(system));
    messages.extend(conversation);

    let (relay, _task) = spawn_relay(state.llm.clone(), state.llm.model().to_string(), messages);
    let body = Body::from_stream(relay.map(|event| Ok::<_, Infallible>(event.encode())));

    Ok((
        [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        body,
    )
        .into_response())
}
