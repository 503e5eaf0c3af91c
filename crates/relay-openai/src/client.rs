// SPDX-FileCopyrightText: 2026 Relay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for OpenAI-compatible chat-completions APIs.
//!
//! Provides [`OpenAiClient`] which handles request construction, bearer
//! authentication, and status handling. Requests are never retried.

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use relay_core::RelayError;
use tracing::debug;

use crate::types::{ApiErrorResponse, ChatRequest, ChatResponse};

/// HTTP client for one OpenAI-compatible endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    endpoint: String,
}

impl OpenAiClient {
    /// Creates a client for `{base_url}/chat/completions`.
    pub fn new(
        api_key: &str,
        organization: Option<&str>,
        base_url: &str,
    ) -> Result<Self, RelayError> {
        let mut headers = HeaderMap::new();
        let mut bearer = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|e| RelayError::Config(format!("invalid API key header value: {e}")))?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);
        if let Some(org) = organization {
            headers.insert(
                "openai-organization",
                HeaderValue::from_str(org).map_err(|e| {
                    RelayError::Config(format!("invalid organization header value: {e}"))
                })?,
            );
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| RelayError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
        })
    }

    /// The full chat-completions URL requests are posted to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Sends a non-streaming request and parses the full response.
    pub async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, RelayError> {
        let response = self.send(request).await?;
        let body = response.text().await.map_err(|e| {
            RelayError::unavailable_from(format!("failed to read response body: {e}"), e)
        })?;
        serde_json::from_str(&body).map_err(|e| {
            RelayError::protocol_from(format!("failed to parse API response: {e}"), e)
        })
    }

    /// Sends a request and returns the response once a success status arrived.
    pub async fn send(&self, request: &ChatRequest) -> Result<reqwest::Response, RelayError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| RelayError::unavailable_from(format!("HTTP request failed: {e}"), e))?;

        let status = response.status();
        debug!(status = %status, stream = request.stream, "chat completion response received");

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ApiErrorResponse>(&body) {
            Ok(api_err) => match api_err.error.type_ {
                Some(kind) => format!("API error ({kind}): {}", api_err.error.message),
                None => format!("API error: {}", api_err.error.message),
            },
            Err(_) => format!("API returned {status}: {body}"),
        };
        Err(RelayError::unavailable(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_core::PromptMessage;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_request() -> ChatRequest {
        ChatRequest {
            model: "gpt-4o-mini".into(),
            messages: vec![PromptMessage::user("Hello")],
            stream: false,
            stream_options: None,
        }
    }

    #[tokio::test]
    async fn sends_bearer_and_organization_headers() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(header("openai-organization", "org-42"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": "ok"}, "finish_reason": "stop"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client =
            OpenAiClient::new("sk-test", Some("org-42"), &format!("{}/v1/", server.uri())).unwrap();
        assert!(client.endpoint().ends_with("/v1/chat/completions"));
        let response = client.complete(&test_request()).await.unwrap();
        assert_eq!(response.choices[0].message.content.as_deref(), Some("ok"));
    }

    #[tokio::test]
    async fn error_status_is_not_retried() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
                "error": {"type": "rate_limit_error", "message": "Rate limited"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = OpenAiClient::new("sk-test", None, &server.uri()).unwrap();
        let err = client.complete(&test_request()).await.unwrap_err();
        assert!(matches!(err, RelayError::BackendUnavailable { .. }));
        assert!(err.to_string().contains("rate_limit_error"), "got: {err}");
    }

    #[tokio::test]
    async fn unstructured_error_body_is_included() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let client = OpenAiClient::new("sk-test", None, &server.uri()).unwrap();
        let err = client.complete(&test_request()).await.unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("502") && msg.contains("bad gateway"), "got: {msg}");
    }

    #[tokio::test]
    async fn invalid_json_is_a_protocol_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let client = OpenAiClient::new("sk-test", None, &server.uri()).unwrap();
        let err = client.complete(&test_request()).await.unwrap_err();
        assert!(matches!(err, RelayError::BackendProtocol { .. }), "got: {err}");
    }

    #[test]
    fn invalid_key_is_a_config_error() {
        let err = OpenAiClient::new("bad\nkey", None, "http://localhost").unwrap_err();
        assert!(matches!(err, RelayError::Config(_)));
    }
}
