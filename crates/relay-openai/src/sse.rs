// SPDX-FileCopyrightText: 2026 Relay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SSE stream parser for chat-completions streaming responses.
//!
//! Converts a reqwest response byte stream into typed [`ChatChunk`]s using the
//! `eventsource-stream` crate for SSE protocol compliance. The stream ends at
//! the `[DONE]` sentinel or when the body ends, whichever comes first.

use async_stream::try_stream;
use eventsource_stream::{EventStreamError, Eventsource};
use futures::stream::{Stream, StreamExt};
use relay_core::RelayError;

use crate::types::ChatChunk;

/// Payload of the final SSE event.
const DONE_MARKER: &str = "[DONE]";

/// Parses a streaming response body into chat-completion chunks.
pub fn parse_sse_stream(
    response: reqwest::Response,
) -> impl Stream<Item = Result<ChatChunk, RelayError>> + Send {
    try_stream! {
        let mut events = Box::pin(response.bytes_stream().eventsource());

        while let Some(event) = events.next().await {
            let event = event.map_err(map_event_error)?;
            let data = event.data.trim();
            if data == DONE_MARKER {
                break;
            }
            if data.is_empty() {
                continue;
            }

            yield parse_chunk(data)?;
        }
    }
}

/// Parses one `data:` payload; an in-band `error` object ends the stream.
fn parse_chunk(data: &str) -> Result<ChatChunk, RelayError> {
    let chunk: ChatChunk = serde_json::from_str(data)
        .map_err(|e| RelayError::protocol_from(format!("failed to parse stream chunk: {e}"), e))?;
    match &chunk.error {
        Some(error) => Err(RelayError::unavailable(format!(
            "API error during streaming: {}",
            error.message
        ))),
        None => Ok(chunk),
    }
}

fn map_event_error(err: EventStreamError<reqwest::Error>) -> RelayError {
    match err {
        EventStreamError::Transport(e) => {
            RelayError::unavailable_from(format!("SSE stream read failed: {e}"), e)
        }
        other => RelayError::protocol(format!("malformed event stream: {other}")),
    }
}
