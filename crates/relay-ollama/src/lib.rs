// SPDX-FileCopyrightText: 2026 Relay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Local-daemon adapter for Ollama-style `/api/generate` backends.
//!
//! Prompts are flattened with the prompt normalizer and sent as a single
//! string. Streaming responses are newline-delimited JSON, split with the
//! core [`LineDecoder`]. The daemon's token counts are not read, so usage is
//! always reported as zero.

pub mod client;
pub mod types;

use async_stream::try_stream;
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{Stream, StreamExt};
use relay_config::RelayConfig;
use relay_core::decoder::LineDecoder;
use relay_core::prompt::normalize;
use relay_core::{
    EventStream, FinishReason, GenerateResult, ModelAdapter, Prompt, RawCall, RelayError,
    StreamEvent, Usage,
};
use tracing::{debug, info};

use crate::client::OllamaClient;
use crate::types::{GenerateChunk, GenerateRequest};

/// Backend name reported by [`OllamaProvider::name`].
pub const BACKEND_NAME: &str = "local";

/// Local-daemon provider implementing [`ModelAdapter`].
pub struct OllamaProvider {
    client: OllamaClient,
    model: String,
    base_url: String,
}

impl OllamaProvider {
    /// Creates a provider from the `[local]` configuration section.
    pub fn new(config: &RelayConfig) -> Result<Self, RelayError> {
        let local = &config.local;
        let client = OllamaClient::new(&local.base_url)?;

        info!(
            model = local.model,
            endpoint = client.endpoint(),
            "local provider initialized"
        );

        Ok(Self {
            client,
            model: local.model.clone(),
            base_url: local.base_url.clone(),
        })
    }

    fn to_request(&self, prompt: &Prompt, stream: bool) -> GenerateRequest {
        GenerateRequest {
            model: self.model.clone(),
            prompt: normalize(prompt),
            stream,
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
impl ModelAdapter for OllamaProvider {
    fn name(&self) -> &str {
        BACKEND_NAME
    }

    fn model_id(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: Prompt) -> Result<GenerateResult, RelayError> {
        let request = self.to_request(&prompt, false);
        debug!(model = %self.model, prompt_len = request.prompt.len(), "sending generate request");

        let chunk = self.client.generate(&request).await?;

        Ok(GenerateResult {
            text: chunk.response,
            reasoning: None,
            finish_reason: FinishReason::Stop,
            usage: Usage::ZERO,
            raw_call: self.raw_call(prompt),
        })
    }

    fn stream(&self, prompt: Prompt) -> EventStream {
        let request = self.to_request(&prompt, true);
        debug!(model = %self.model, prompt_len = request.prompt.len(), "opening generate stream");
        Box::pin(generate_events(self.client.clone(), request))
    }
}

/// Issues the streaming request on first poll and maps NDJSON lines to events.
fn generate_events(
    client: OllamaClient,
    request: GenerateRequest,
) -> impl Stream<Item = Result<StreamEvent, RelayError>> + Send {
    try_stream! {
        let response = client.send(&request).await?;
        let mut fragments = Box::pin(parse_ndjson_stream(response.bytes_stream()));
        while let Some(fragment) = fragments.next().await {
            yield StreamEvent::text(fragment?);
        }
        yield StreamEvent::finish(FinishReason::Stop, Usage::ZERO);
    }
}

/// Decodes an NDJSON body into the non-empty `response` fragments it carries.
///
/// A line with an `error` field ends the stream with
/// [`RelayError::BackendUnavailable`]; a line that is not valid JSON ends it
/// with [`RelayError::BackendProtocol`]. A final line without a trailing
/// newline is still parsed.
pub fn parse_ndjson_stream<S, E>(bytes: S) -> impl Stream<Item = Result<String, RelayError>> + Send
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: std::error::Error + Send + Sync + 'static,
{
    try_stream! {
        let mut bytes = Box::pin(bytes);
        let mut lines = LineDecoder::new();

        while let Some(chunk) = bytes.next().await {
            let chunk = chunk
                .map_err(|e| RelayError::unavailable_from(format!("stream read failed: {e}"), e))?;
            for line in lines.push(&chunk) {
                if let Some(fragment) = parse_line(&line)? {
                    yield fragment;
                }
            }
        }

        let residual = lines.residual().to_string();
        if let Some(fragment) = parse_line(&residual)? {
            yield fragment;
        }
    }
}

fn parse_line(line: &str) -> Result<Option<String>, RelayError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let chunk: GenerateChunk = serde_json::from_str(line).map_err(|e| {
        RelayError::protocol_from(format!("failed to parse stream line: {e}"), e)
    })?;
    if let Some(error) = chunk.error {
        return Err(RelayError::unavailable(format!("daemon error: {error}")));
    }
    Ok((!chunk.response.is_empty()).then_some(chunk.response))
}
