// SPDX-FileCopyrightText: 2026 Relay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hosted-API adapter for OpenAI-compatible chat-completions backends.
//!
//! This crate implements [`ModelAdapter`] for `POST {base_url}/chat/completions`,
//! providing both one-shot generation and SSE streaming normalized into
//! canonical [`StreamEvent`]s.

pub mod client;
pub mod sse;
pub mod types;

use async_stream::try_stream;
use async_trait::async_trait;
use futures::stream::{Stream, StreamExt};
use relay_config::RelayConfig;
use relay_core::prompt::to_chat_messages;
use relay_core::{
    EventStream, FinishReason, GenerateResult, ModelAdapter, Prompt, RawCall, RelayError,
    StreamEvent, Usage,
};
use tracing::{debug, info};

use crate::client::OpenAiClient;
use crate::types::{ChatRequest, StreamOptions, map_finish_reason};

/// Backend name reported by [`OpenAiProvider::name`].
pub const BACKEND_NAME: &str = "hosted";

/// Hosted-API provider implementing [`ModelAdapter`].
pub struct OpenAiProvider {
    client: OpenAiClient,
    model: String,
    base_url: String,
}

impl OpenAiProvider {
    /// Creates a provider from the `[hosted]` configuration section.
    ///
    /// The API key must already be resolved; `OPENAI_API_KEY` is consulted by
    /// the configuration loader, not here.
    pub fn new(config: &RelayConfig) -> Result<Self, RelayError> {
        let hosted = &config.hosted;
        let api_key = hosted
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| RelayError::Config("hosted.api_key is not set".into()))?;

        let client = OpenAiClient::new(api_key, hosted.organization.as_deref(), &hosted.base_url)?;

        info!(
            model = hosted.model,
            endpoint = client.endpoint(),
            "hosted provider initialized"
        );

        Ok(Self {
            client,
            model: hosted.model.clone(),
            base_url: hosted.base_url.clone(),
        })
    }

    fn to_request(&self, prompt: &Prompt, stream: bool) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: to_chat_messages(prompt),
            stream,
            stream_options: stream.then_some(StreamOptions {
                include_usage: true,
            }),
        }
    }

    fn raw_call(&self, prompt: Prompt) -> RawCall {
        RawCall {
            prompt,
            settings: serde_json::json!({
                "backend": BACKEND_NAME,
                "model": self.model,
                "baseUrl": self.base_url,
            }),
        }
    }
}

#[async_trait]
impl ModelAdapter for OpenAiProvider {
    fn name(&self) -> &str {
        BACKEND_NAME
    }

    fn model_id(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: Prompt) -> Result<GenerateResult, RelayError> {
        let request = self.to_request(&prompt, false);
        debug!(model = %self.model, messages = request.messages.len(), "sending completion request");

        let response = self.client.complete(&request).await?;
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| RelayError::protocol("response carried no choices"))?;

        Ok(GenerateResult {
            text: choice.message.content.unwrap_or_default(),
            reasoning: None,
            finish_reason: choice
                .finish_reason
                .as_deref()
                .map_or(FinishReason::Unknown, map_finish_reason),
            usage: response.usage.map(Usage::from).unwrap_or_default(),
            raw_call: self.raw_call(prompt),
        })
    }

    fn stream(&self, prompt: Prompt) -> EventStream {
        let request = self.to_request(&prompt, true);
        debug!(model = %self.model, messages = request.messages.len(), "opening completion stream");
        Box::pin(completion_events(self.client.clone(), request))
    }
}

/// Issues the streaming request on first poll and maps chunks to canonical events.
///
/// The last seen finish reason and usage are carried into one synthesized
/// `Finish` emitted once the SSE stream ends.
fn completion_events(
    client: OpenAiClient,
    request: ChatRequest,
) -> impl Stream<Item = Result<StreamEvent, RelayError>> + Send {
    try_stream! {
        let response = client.send(&request).await?;
        let mut chunks = Box::pin(sse::parse_sse_stream(response));
        let mut finish_reason = FinishReason::Unknown;
        let mut usage = Usage::ZERO;

        while let Some(chunk) = chunks.next().await {
            let chunk = chunk?;
            if let Some(reported) = chunk.usage {
                usage = reported.into();
            }
            for choice in chunk.choices {
                if let Some(reason) = choice.finish_reason.as_deref() {
                    finish_reason = map_finish_reason(reason);
                }
                if let Some(content) = choice.delta.content.filter(|c| !c.is_empty()) {
                    yield StreamEvent::text(content);
                }
            }
        }

        yield StreamEvent::finish(finish_reason, usage);
    }
}
