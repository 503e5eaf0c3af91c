// SPDX-FileCopyrightText: 2026 Relay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reasoning extraction middleware.
//!
//! Splits text wrapped in `<tag>` / `</tag>` markers into a separate reasoning
//! channel. Markers may be split across any number of fragments; order is kept
//! and no characters other than the markers are dropped.

use std::sync::Arc;

use async_stream::stream;
use async_trait::async_trait;
use futures::StreamExt;
use tracing::debug;

use crate::error::RelayError;
use crate::traits::{EventStream, ModelAdapter};
use crate::types::{GenerateResult, Prompt, StreamEvent};

/// Default reasoning tag name.
pub const DEFAULT_REASONING_TAG: &str = "think";

/// Incremental scanner that routes text to the answer or reasoning channel.
#[derive(Debug, Clone)]
pub struct TagScanner {
    open: String,
    close: String,
    inside: bool,
    /// Text that may be the start of a marker, held until the next fragment.
    held: String,
}

impl TagScanner {
    /// Creates a scanner for `<tag>` / `</tag>`.
    pub fn new(tag: &str) -> Self {
        Self {
            open: format!("<{tag}>"),
            close: format!("</{tag}>"),
            inside: false,
            held: String::new(),
        }
    }

    /// Feeds one fragment and returns the events that are now certain.
    pub fn push(&mut self, text: &str) -> Vec<StreamEvent> {
        self.held.push_str(text);
        let mut events = Vec::new();

        loop {
            let marker = if self.inside { &self.close } else { &self.open };

            if let Some(idx) = self.held.find(marker.as_str()) {
                let before: String = self.held.drain(..idx).collect();
                self.held.drain(..marker.len());
                events.extend(channel_event(self.inside, before));
                self.inside = !self.inside;
                continue;
            }

            let keep = partial_marker_len(&self.held, marker);
            let ready_len = self.held.len() - keep;
            let ready: String = self.held.drain(..ready_len).collect();
            events.extend(channel_event(self.inside, ready));
            return events;
        }
    }

    /// Emits whatever is still held back. Call once the input has ended.
    pub fn flush(&mut self) -> Option<StreamEvent> {
        let held = std::mem::take(&mut self.held);
        channel_event(self.inside, held)
    }
}

fn channel_event(inside: bool, text: String) -> Option<StreamEvent> {
    if text.is_empty() {
        None
    } else if inside {
        Some(StreamEvent::reasoning(text))
    } else {
        Some(StreamEvent::text(text))
    }
}

/// Length of the longest suffix of `text` that is a proper prefix of `marker`.
fn partial_marker_len(text: &str, marker: &str) -> usize {
    let start = text.len().saturating_sub(marker.len().saturating_sub(1));
    (start..text.len())
        .find(|&i| text.is_char_boundary(i) && marker.as_bytes().starts_with(&text.as_bytes()[i..]))
        .map_or(0, |i| text.len() - i)
}

/// Splits a complete text into `(reasoning, answer)`.
///
/// Multiple reasoning regions are concatenated in order.
pub fn split_reasoning(text: &str, tag: &str) -> (String, String) {
    let mut scanner = TagScanner::new(tag);
    let mut reasoning = String::new();
    let mut answer = String::new();

    for event in scanner.push(text).into_iter().chain(scanner.flush()) {
        match event {
            StreamEvent::ReasoningDelta { text_delta } => reasoning.push_str(&text_delta),
            StreamEvent::TextDelta { text_delta } => answer.push_str(&text_delta),
            StreamEvent::Finish { .. } => {}
        }
    }

    (reasoning, answer)
}

/// Wraps a canonical stream so text inside the tag pair becomes reasoning deltas.
///
/// Held-back text is flushed before the terminal `Finish`, or when the inner
/// stream ends without one. Errors pass through and end the stream.
pub fn extract_reasoning(inner: EventStream, tag: &str) -> EventStream {
    let mut scanner = TagScanner::new(tag);

    Box::pin(stream! {
        let mut inner = inner;

        while let Some(item) = inner.next().await {
            match item {
                Ok(StreamEvent::TextDelta { text_delta }) => {
                    for event in scanner.push(&text_delta) {
                        yield Ok(event);
                    }
                }
                Ok(finish @ StreamEvent::Finish { .. }) => {
                    if let Some(event) = scanner.flush() {
                        yield Ok(event);
                    }
                    yield Ok(finish);
                    return;
                }
                Ok(other) => {
                    yield Ok(other);
                }
                Err(e) => {
                    yield Err(e);
                    return;
                }
            }
        }

        // Inner stream ended without a terminal event.
        if let Some(event) = scanner.flush() {
            yield Ok(event);
        }
    })
}

/// An adapter decorator that applies [`extract_reasoning`] to another adapter.
pub struct ReasoningAdapter {
    inner: Arc<dyn ModelAdapter>,
    tag: String,
}

impl ReasoningAdapter {
    pub fn new(inner: Arc<dyn ModelAdapter>, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        debug!(adapter = inner.name(), tag = %tag, "reasoning middleware attached");
        Self { inner, tag }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }
}

#[async_trait]
impl ModelAdapter for ReasoningAdapter {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn model_id(&self) -> &str {
        self.inner.model_id()
    }

    async fn generate(&self, prompt: Prompt) -> Result<GenerateResult, RelayError> {
        let mut result = self.inner.generate(prompt).await?;
        let (reasoning, answer) = split_reasoning(&result.text, &self.tag);
        result.text = answer;
        result.reasoning = (!reasoning.is_empty()).then_some(reasoning);
        Ok(result)
    }

    fn stream(&self, prompt: Prompt) -> EventStream {
        extract_reasoning(self.inner.stream(prompt), &self.tag)
    }
}
