//! Server-sent event decoding for streamed chat completions.
//!
//! Providers send `data: {json}` frames separated by a blank line and close
//! the stream with `data: [DONE]`. Network chunks do not respect frame
//! boundaries, so [`SseDecoder`] buffers bytes until a whole frame is
//! available.
//!
//! # Example
//!
//! ```rust
//! use aibot::sse::{ChunkEvent, SseDecoder, parse_chunk};
//!
//! let mut decoder = SseDecoder::new();
//! assert!(decoder.push(b"data: {\"choices\":[{\"delta\":{\"content\":\"Hi\"}}]}").is_empty());
//! let frames = decoder.push(b"\n\n");
//! assert_eq!(parse_chunk(&frames[0]).unwrap(), ChunkEvent::Delta("Hi".to_string()));
//! ```

use crate::error::{RelayError, Result};

/// Incremental decoder from raw bytes to `data:` payloads.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buf: Vec<u8>,
}

impl SseDecoder {
    /// Create an empty decoder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed bytes and return the payload of every frame they complete.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        // CR only ever appears in line terminators; JSON escapes it in strings.
        self.buf.extend(chunk.iter().copied().filter(|b| *b != b'\r'));

        let mut out = Vec::new();
        while let Some(pos) = find_double_newline(&self.buf) {
            let frame = self.buf.drain(..pos + 2).collect::<Vec<_>>();
            if let Some(data) = frame_data(&frame) {
                out.push(data);
            }
        }
        out
    }

    /// Flush a trailing frame that was not terminated by a blank line.
    pub fn finish(&mut self) -> Option<String> {
        let frame = std::mem::take(&mut self.buf);
        frame_data(&frame)
    }
}

/// Find the position of a double newline in the buffer.
fn find_double_newline(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == b"\n\n")
}

/// Join the `data:` lines of one frame; comments and other fields are dropped.
fn frame_data(frame: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(frame);
    let mut data: Option<String> = None;

    for line in text.lines() {
        let Some(rest) = line.strip_prefix("data:") else {
            continue;
        };
        let value = rest.strip_prefix(' ').unwrap_or(rest);
        match &mut data {
            Some(d) => {
                d.push('\n');
                d.push_str(value);
            }
            None => data = Some(value.to_string()),
        }
    }

    data
}

/// Meaning of one decoded `data:` payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkEvent {
    /// Assistant text fragment to forward.
    Delta(String),
    /// End of stream marker.
    Done,
    /// Chunk without text (role header, finish reason, usage).
    Empty,
}

/// Interpret a `data:` payload from a chat-completions stream.
///
/// # Errors
///
/// Fails on undecodable JSON or on an `error` object sent by the provider.
pub fn parse_chunk(data: &str) -> Result<ChunkEvent> {
    let data = data.trim();
    if data == "[DONE]" {
        return Ok(ChunkEvent::Done);
    }
    if data.is_empty() {
        return Ok(ChunkEvent::Empty);
    }

    let v: serde_json::Value = serde_json::from_str(data)?;

    if let Some(err) = v.get("error").filter(|e| !e.is_null()) {
        let message = err
            .get("message")
            .and_then(|m| m.as_str())
            .map_or_else(|| err.to_string(), ToString::to_string);
        return Err(RelayError::Stream(message));
    }

    let content = v["choices"][0]["delta"]["content"].as_str().unwrap_or_default();
    if content.is_empty() {
        Ok(ChunkEvent::Empty)
    } else {
        Ok(ChunkEvent::Delta(content.to_string()))
    }
}
