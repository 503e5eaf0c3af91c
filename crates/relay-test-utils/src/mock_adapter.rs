// SPDX-FileCopyrightText: 2026 Relay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock model adapter for deterministic testing.
//!
//! `MockAdapter` implements `ModelAdapter` with pre-configured replies,
//! enabling fast, CI-runnable tests without a backend.

use std::collections::VecDeque;
use std::sync::Arc;

use async_stream::stream;
use async_trait::async_trait;
use tokio::sync::Mutex;

use relay_core::{
    EventStream, FinishReason, GenerateResult, ModelAdapter, Prompt, RawCall, RelayError,
    StreamEvent, Usage,
};

/// Usage reported by every successful mock reply.
pub const MOCK_USAGE: Usage = Usage {
    prompt_tokens: 10,
    completion_tokens: 20,
};

/// One scripted reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockReply {
    /// Streamed as one text delta per fragment; concatenated for `generate`.
    Fragments(Vec<String>),
    /// Streams the fragments, then fails with `BackendUnavailable` instead of finishing.
    FailAfter(Vec<String>, String),
}

impl MockReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Fragments(vec![text.into()])
    }

    pub fn fragments<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Fragments(fragments.into_iter().map(Into::into).collect())
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::FailAfter(Vec::new(), message.into())
    }
}

/// A mock adapter that returns pre-configured replies.
///
/// Replies are popped from a FIFO queue. When the queue is empty, a default
/// "mock response" text is returned. Every prompt received is recorded.
pub struct MockAdapter {
    name: String,
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    prompts: Arc<Mutex<Vec<Prompt>>>,
}

impl MockAdapter {
    /// Create a new mock adapter with an empty reply queue.
    pub fn new() -> Self {
        Self::named("mock")
    }

    /// Create a mock adapter reporting `name` as its backend and model.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            replies: Arc::new(Mutex::new(VecDeque::new())),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a mock adapter pre-loaded with the given replies.
    pub fn with_replies(replies: Vec<MockReply>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(VecDeque::from(replies))),
            ..Self::new()
        }
    }

    /// Add a reply to the end of the queue.
    pub async fn add_reply(&self, reply: MockReply) {
        self.replies.lock().await.push_back(reply);
    }

    /// Every prompt received so far, in call order.
    pub async fn prompts(&self) -> Vec<Prompt> {
        self.prompts.lock().await.clone()
    }

    fn raw_call(&self, prompt: Prompt) -> RawCall {
        RawCall {
            prompt,
            settings: serde_json::json!({"backend": self.name, "model": self.name}),
        }
    }
}

impl Default for MockAdapter {
    fn default() -> Self {
        Self::new()
    }
}

/// Pop the next reply, or return the default.
async fn next_reply(replies: &Mutex<VecDeque<MockReply>>) -> MockReply {
    replies
        .lock()
        .await
        .pop_front()
        .unwrap_or_else(|| MockReply::text("mock response"))
}

#[async_trait]
impl ModelAdapter for MockAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn model_id(&self) -> &str {
        &self.name
    }

    async fn generate(&self, prompt: Prompt) -> Result<GenerateResult, RelayError> {
        self.prompts.lock().await.push(prompt.clone());
        match next_reply(&self.replies).await {
            MockReply::Fragments(fragments) => Ok(GenerateResult {
                text: fragments.concat(),
                reasoning: None,
                finish_reason: FinishReason::Stop,
                usage: MOCK_USAGE,
                raw_call: self.raw_call(prompt),
            }),
            MockReply::FailAfter(_, message) => Err(RelayError::unavailable(message)),
        }
    }

    fn stream(&self, prompt: Prompt) -> EventStream {
        let replies = Arc::clone(&self.replies);
        let prompts = Arc::clone(&self.prompts);

        Box::pin(stream! {
            prompts.lock().await.push(prompt);
            let (fragments, failure) = match next_reply(&replies).await {
                MockReply::Fragments(fragments) => (fragments, None),
                MockReply::FailAfter(fragments, message) => (fragments, Some(message)),
            };

            for fragment in fragments.into_iter().filter(|f| !f.is_empty()) {
                yield Ok(StreamEvent::text(fragment));
            }
            match failure {
                Some(message) => {
                    yield Err(RelayError::unavailable(message));
                }
                None => {
                    yield Ok(StreamEvent::finish(FinishReason::Stop, MOCK_USAGE));
                }
            }
        })
    }
}
