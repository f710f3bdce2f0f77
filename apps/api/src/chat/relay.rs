//! Streaming Relay: Forwards upstream completion tokens to the client as
//! they arrive.
//!
//! One task per client connection reads the upstream body and pushes
//! `RelayEvent`s into a bounded channel. The receiving side, `ChatRelay`, holds
//! a drop guard on the task's cancellation token: when the client goes away
//! the response body is dropped, the token fires, and the task abandons the
//! upstream read at its next await point.

use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, info, warn};

use crate::llm_client::stream::{parse_stream_line, LineBuffer, StreamLine};
use crate::llm_client::{ChatMessage, LlmClient, LlmError};

const CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayEvent {
    Token(String),
    Error(&'static str),
    Done,
}

impl RelayEvent {
    /// Wire frame for this event. Line breaks inside a token are sent as the
    /// two-character escapes `\n` and `\r` so a token never ends its frame early.
    pub fn encode(&self) -> Bytes {
        match self {
            RelayEvent::Token(text) => {
                let escaped = text.replace('\r', "\\r").replace('\n', "\\n");
                Bytes::from(format!("data: {escaped}\n\n"))
            }
            RelayEvent::Error(reason) => Bytes::from(format!("event: error\ndata: {reason}\n\n")),
            RelayEvent::Done => Bytes::from_static(b"data: [DONE]\n\n"),
        }
    }
}

/// Receiving half of a relay. Dropping it stops the relay task.
pub struct ChatRelay {
    rx: mpsc::Receiver<RelayEvent>,
    _guard: DropGuard,
}

impl Stream for ChatRelay {
    type Item = RelayEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

/// Starts relaying a streaming completion. The stream always ends with
/// `Done` unless it is dropped first.
pub fn spawn_relay(
    llm: LlmClient,
    model: String,
    messages: Vec<ChatMessage>,
) -> (ChatRelay, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
    let cancel = CancellationToken::new();
    let guard = cancel.clone().drop_guard();

    let handle = tokio::spawn(async move {
        tokio::select! {
            _ = cancel.cancelled() => {
                info!("Chat client disconnected; upstream stream dropped");
            }
            _ = relay(&llm, &model, &messages, &tx) => {}
        }
    });

    (ChatRelay { rx, _guard: guard }, handle)
}

async fn relay(
    llm: &LlmClient,
    model: &str,
    messages: &[ChatMessage],
    tx: &mpsc::Sender<RelayEvent>,
) {
    if let Err(reason) = pump(llm, model, messages, tx).await {
        let _ = tx.send(RelayEvent::Error(reason)).await;
    }
    let _ = tx.send(RelayEvent::Done).await;
}

/// Copies deltas from upstream into the channel until the upstream finishes,
/// fails mid-read, or the receiver is gone. Only failures to open the stream
/// are reported as errors.
async fn pump(
    llm: &LlmClient,
    model: &str,
    messages: &[ChatMessage],
    tx: &mpsc::Sender<RelayEvent>,
) -> Result<(), &'static str> {
    let response = llm.open_stream(model, messages).await.map_err(|e| {
        warn!("Failed to open completion stream: {e}");
        failure_reason(&e)
    })?;

    let mut body = response.bytes_stream();
    let mut lines = LineBuffer::default();
    let mut forwarded = 0usize;

    while let Some(chunk) = body.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(e) => {
                warn!("Completion stream read error after {forwarded} tokens: {e}");
                return Ok(());
            }
        };
        lines.extend(&chunk);

        while let Some(line) = lines.next_line() {
            match parse_stream_line(&line) {
                StreamLine::Skip => {}
                StreamLine::Done => {
                    debug!("Upstream finished after {forwarded} tokens");
                    return Ok(());
                }
                StreamLine::Delta(text) => {
                    if tx.send(RelayEvent::Token(text)).await.is_err() {
                        return Ok(());
                    }
                    forwarded += 1;
                }
            }
        }
    }

    debug!("Upstream closed after {forwarded} tokens");
    Ok(())
}

fn failure_reason(error: &LlmError) -> &'static str {
    match error {
        LlmError::MissingCredential => "build error",
        LlmError::Api { .. } => "upstream error",
        _ => "connection failed",
    }
}
