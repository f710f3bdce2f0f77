//! Decoding of the upstream's line-delimited streaming body.
//!
//! The body arrives in arbitrary network chunks. `LineBuffer` reassembles
//! complete lines at the byte level (so a multi-byte character split across
//! two chunks survives), and `parse_stream_line` classifies each line.

use bytes::{Buf, BytesMut};
use serde::Deserialize;
use tracing::debug;

const DATA_PREFIX: &str = "data:";
const DONE_MARKER: &str = "[DONE]";

/// What a single upstream line means to the relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamLine {
    /// Blank line, comment, keep-alive, undecodable or empty fragment.
    Skip,
    /// The upstream's termination marker.
    Done,
    /// One incremental piece of generated text.
    Delta(String),
}

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    delta: StreamDelta,
}

#[derive(Debug, Deserialize)]
struct StreamDelta {
    #[serde(default)]
    content: Option<String>,
}

/// Accumulates raw body chunks and hands out complete lines.
#[derive(Debug, Default)]
pub struct LineBuffer {
    buf: BytesMut,
}

impl LineBuffer {
    pub fn extend(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// Pops the next `\n`-terminated line, without its terminator.
    /// A trailing partial line stays buffered until more bytes arrive.
    pub fn next_line(&mut self) -> Option<String> {
        let newline = self.buf.iter().position(|b| *b == b'\n')?;
        let line = self.buf.split_to(newline);
        self.buf.advance(1);
        Some(String::from_utf8_lossy(&line).into_owned())
    }
}

pub fn parse_stream_line(line: &str) -> StreamLine {
    let line = line.trim();
    let Some(data) = line.strip_prefix(DATA_PREFIX) else {
        return StreamLine::Skip;
    };
    let data = data.trim();
    if data.is_empty() {
        return StreamLine::Skip;
    }
    if data == DONE_MARKER {
        return StreamLine::Done;
    }

    let chunk: StreamChunk = match serde_json::from_str(data) {
        Ok(chunk) => chunk,
        Err(e) => {
            debug!("Skipping undecodable stream line: {e}");
            return StreamLine::Skip;
        }
    };

    match chunk
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.delta.content)
    {
        Some(token) if !token.is_empty() => StreamLine::Delta(token),
        _ => StreamLine::Skip,
    }
}
