// SPDX-FileCopyrightText: 2026 Relay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook adapter: one POST of `{chatInput, sessionId}` to an external endpoint.
//!
//! `generate` expects a single JSON body. `stream` hands the body to the core
//! stream decoder, which reads `data: {"text": ...}` lines and silently skips
//! anything else.

use async_stream::try_stream;
use async_trait::async_trait;
use futures::stream::{Stream, StreamExt};
use relay_config::RelayConfig;
use relay_core::decoder::decode;
use relay_core::prompt::normalize;
use relay_core::{
    EventStream, FinishReason, GenerateResult, ModelAdapter, Prompt, RawCall, RelayError,
    StreamEvent, Usage,
};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use tracing::{debug, info};

/// Backend name reported by [`WebhookProvider::name`].
pub const BACKEND_NAME: &str = "webhook";

/// Request body posted to the webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookRequest {
    pub chat_input: String,
    pub session_id: String,
}

/// Webhook provider implementing [`ModelAdapter`].
pub struct WebhookProvider {
    client: reqwest::Client,
    url: String,
    session_id: String,
}

impl WebhookProvider {
    /// Creates a provider from the `[webhook]` configuration section.
    pub fn new(config: &RelayConfig) -> Result<Self, RelayError> {
        let webhook = &config.webhook;
        let url = webhook
            .url
            .clone()
            .ok_or_else(|| RelayError::Config("webhook.url is not set".into()))?;

        let mut headers = HeaderMap::new();
        for (name, value) in &webhook.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| RelayError::Config(format!("invalid webhook header `{name}`: {e}")))?;
            let mut value = HeaderValue::from_str(value).map_err(|e| {
                RelayError::Config(format!("invalid value for webhook header `{name}`: {e}"))
            })?;
            value.set_sensitive(true);
            headers.insert(name, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| RelayError::Config(format!("failed to build HTTP client: {e}")))?;

        info!(
            url = %url,
            session_id = webhook.session_id,
            extra_headers = webhook.headers.len(),
            "webhook provider initialized"
        );

        Ok(Self {
            client,
            url,
            session_id: webhook.session_id.clone(),
        })
    }

    fn to_request(&self, prompt: &Prompt) -> WebhookRequest {
        WebhookRequest {
            chat_input: normalize(prompt),
            session_id: self.session_id.clone(),
        }
    }

    fn raw_call(&self, prompt: Prompt) -> RawCall {
        RawCall {
            prompt,
            settings: serde_json::json!({
                "backend": BACKEND_NAME,
                "model": BACKEND_NAME,
                "url": self.url,
                "sessionId": self.session_id,
            }),
        }
    }
}

/// Posts the request once. A non-success status fails before any body is read.
async fn send(
    client: &reqwest::Client,
    url: &str,
    request: &WebhookRequest,
) -> Result<reqwest::Response, RelayError> {
    let response = client
        .post(url)
        .json(request)
        .send()
        .await
        .map_err(|e| RelayError::unavailable_from(format!("webhook request failed: {e}"), e))?;

    let status = response.status();
    debug!(status = %status, "webhook response received");

    if !status.is_success() {
        return Err(RelayError::unavailable(format!("webhook returned {status}")));
    }
    Ok(response)
}

/// Renders a single JSON response body as result text.
///
/// A JSON string yields its contents; any other JSON value yields its
/// serialized form.
fn body_text(body: &str) -> Result<String, RelayError> {
    let value: serde_json::Value = serde_json::from_str(body).map_err(|e| {
        RelayError::protocol_from(format!("webhook response is not JSON: {e}"), e)
    })?;
    Ok(match value {
        serde_json::Value::String(text) => text,
        other => other.to_string(),
    })
}

#[async_trait]
impl ModelAdapter for WebhookProvider {
    fn name(&self) -> &str {
        BACKEND_NAME
    }

    fn model_id(&self) -> &str {
        BACKEND_NAME
    }

    async fn generate(&self, prompt: Prompt) -> Result<GenerateResult, RelayError> {
        let request = self.to_request(&prompt);
        let response = send(&self.client, &self.url, &request).await?;
        let body = response.text().await.map_err(|e| {
            RelayError::unavailable_from(format!("failed to read webhook response: {e}"), e)
        })?;

        Ok(GenerateResult {
            text: body_text(&body)?,
            reasoning: None,
            finish_reason: FinishReason::Stop,
            usage: Usage::ZERO,
            raw_call: self.raw_call(prompt),
        })
    }

    fn stream(&self, prompt: Prompt) -> EventStream {
        Box::pin(webhook_events(
            self.client.clone(),
            self.url.clone(),
            self.to_request(&prompt),
        ))
    }
}

fn webhook_events(
    client: reqwest::Client,
    url: String,
    request: WebhookRequest,
) -> impl Stream<Item = Result<StreamEvent, RelayError>> + Send {
    try_stream! {
        let response = send(&client, &url, &request).await?;
        let mut fragments = Box::pin(decode(response.bytes_stream()));
        while let Some(fragment) = fragments.next().await {
            yield StreamEvent::text(fragment?);
        }
        yield StreamEvent::finish(FinishReason::Stop, Usage::ZERO);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_core::{PromptMessage, collect_stream};
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(url: &str) -> RelayConfig {
        let mut config = RelayConfig::default();
        config.webhook.url = Some(url.to_string());
        config.webhook.session_id = "chat-ui".into();
        config
    }

    async fn mount_body(server: &MockServer, status: u16, body: &str) {
        Mock::given(method("POST"))
            .and(path("/hook"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body.to_string()))
            .expect(1)
            .mount(server)
            .await;
    }

    #[test]
    fn missing_url_is_a_config_error() {
        let config = RelayConfig::default();
        assert!(matches!(
            WebhookProvider::new(&config),
            Err(RelayError::Config(_))
        ));
    }

    #[test]
    fn invalid_header_name_is_a_config_error() {
        let mut config = test_config("http://localhost/hook");
        config.webhook.headers.insert("bad header".into(), "x".into());
        assert!(matches!(
            WebhookProvider::new(&config),
            Err(RelayError::Config(_))
        ));
    }

    #[test]
    fn json_body_rendering() {
        assert_eq!(body_text("\"hello\"").unwrap(), "hello");
        assert_eq!(
            body_text("{\"output\":\"hi\"}").unwrap(),
            "{\"output\":\"hi\"}"
        );
        assert!(matches!(
            body_text("plain text"),
            Err(RelayError::BackendProtocol { .. })
        ));
    }

    #[tokio::test]
    async fn posts_normalized_prompt_with_session_and_headers() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/hook"))
            .and(header("x-api-key", "hook-secret"))
            .and(body_json(serde_json::json!({
                "chatInput": "system: be brief\nuser: hi",
                "sessionId": "chat-ui"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json("hello"))
            .expect(1)
            .mount(&server)
            .await;

        let mut config = test_config(&format!("{}/hook", server.uri()));
        config
            .webhook
            .headers
            .insert("x-api-key".into(), "hook-secret".into());
        let provider = WebhookProvider::new(&config).unwrap();

        let result = provider
            .generate(Prompt::messages([
                PromptMessage::new("system", "be brief"),
                PromptMessage::user("hi"),
            ]))
            .await
            .unwrap();
        assert_eq!(result.text, "hello");
        assert_eq!(result.finish_reason, FinishReason::Stop);
        assert_eq!(result.raw_call.settings["sessionId"], "chat-ui");
    }

    #[tokio::test]
    async fn stream_decodes_fragments_and_drops_partial_tail() {
        let server = MockServer::start().await;
        mount_body(
            &server,
            200,
            "data: {\"text\":\"he\"}\ndata: {\"text\":\"llo\"}\ndata: {\"text\":\"par",
        )
        .await;

        let provider = WebhookProvider::new(&test_config(&format!("{}/hook", server.uri()))).unwrap();
        let events: Vec<StreamEvent> = provider
            .stream(Prompt::from("hi"))
            .map(|e| e.unwrap())
            .collect()
            .await;

        assert_eq!(
            events,
            vec![
                StreamEvent::text("he"),
                StreamEvent::text("llo"),
                StreamEvent::finish(FinishReason::Stop, Usage::ZERO),
            ]
        );
    }

    #[tokio::test]
    async fn streaming_and_non_streaming_agree() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("data: {\"text\":\"hel\"}\ndata: {\"text\":\"lo\"}\n"),
            )
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .respond_with(ResponseTemplate::new(200).set_body_json("hello"))
            .mount(&server)
            .await;

        let provider = WebhookProvider::new(&test_config(&format!("{}/hook", server.uri()))).unwrap();
        let streamed = collect_stream(provider.stream(Prompt::from("hi")))
            .await
            .unwrap();
        let generated = provider.generate(Prompt::from("hi")).await.unwrap();

        assert_eq!(streamed.text, generated.text);
        assert_eq!(
            streamed.finish,
            Some((generated.finish_reason, generated.usage))
        );
    }

    #[tokio::test]
    async fn dropping_after_first_fragment_is_clean() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "data: {\"text\":\"one\"}\ndata: {\"text\":\"two\"}\ndata: {\"text\":\"three\"}\n",
            ))
            .expect(2)
            .mount(&server)
            .await;

        let provider = WebhookProvider::new(&test_config(&format!("{}/hook", server.uri()))).unwrap();
        let mut events = provider.stream(Prompt::from("count"));
        let first = events.next().await.unwrap().unwrap();
        assert_eq!(first, StreamEvent::text("one"));
        drop(events);

        // The adapter stays usable after an abandoned stream.
        let summary = collect_stream(provider.stream(Prompt::from("count")))
            .await
            .unwrap();
        assert_eq!(summary.text, "onetwothree");
        assert_eq!(summary.finish, Some((FinishReason::Stop, Usage::ZERO)));
    }

    #[tokio::test]
    async fn malformed_line_is_skipped() {
        let server = MockServer::start().await;
        mount_body(
            &server,
            200,
            "data: {\"text\":\"a\"}\ndata: {broken\ndata: {\"text\":\"b\"}\n",
        )
        .await;

        let provider = WebhookProvider::new(&test_config(&format!("{}/hook", server.uri()))).unwrap();
        let summary = collect_stream(provider.stream(Prompt::from("hi")))
            .await
            .unwrap();

        assert_eq!(summary.text, "ab");
        assert_eq!(summary.deltas, 2);
        assert_eq!(summary.finish, Some((FinishReason::Stop, Usage::ZERO)));
    }

    #[tokio::test]
    async fn error_status_fails_once_without_decoding() {
        let server = MockServer::start().await;
        mount_body(&server, 500, "data: {\"text\":\"never\"}\n").await;

        let provider = WebhookProvider::new(&test_config(&format!("{}/hook", server.uri()))).unwrap();
        let events: Vec<_> = provider.stream(Prompt::from("hi")).collect().await;

        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0],
            Err(RelayError::BackendUnavailable { .. })
        ));
        // `expect(1)` on the mock verifies no retry when the server drops.
    }

    #[tokio::test]
    async fn generate_error_status_is_unavailable() {
        let server = MockServer::start().await;
        mount_body(&server, 503, "").await;

        let provider = WebhookProvider::new(&test_config(&format!("{}/hook", server.uri()))).unwrap();
        let err = provider.generate(Prompt::from("hi")).await.unwrap_err();
        assert!(matches!(err, RelayError::BackendUnavailable { .. }));
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn generate_rejects_non_json_body() {
        let server = MockServer::start().await;
        mount_body(&server, 200, "data: {\"text\":\"x\"}\n").await;

        let provider = WebhookProvider::new(&test_config(&format!("{}/hook", server.uri()))).unwrap();
        let err = provider.generate(Prompt::from("hi")).await.unwrap_err();
        assert!(matches!(err, RelayError::BackendProtocol { .. }), "got: {err}");
    }
}
