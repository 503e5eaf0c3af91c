// SPDX-FileCopyrightText: 2026 Relay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the local generation daemon.

use relay_core::RelayError;
use tracing::debug;

use crate::types::{ErrorResponse, GenerateChunk, GenerateRequest};

/// HTTP client bound to one daemon's `/api/generate` endpoint.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: reqwest::Client,
    endpoint: String,
}

impl OllamaClient {
    pub fn new(base_url: &str) -> Result<Self, RelayError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| RelayError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: format!("{}/api/generate", base_url.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Sends a non-streaming request and parses the single JSON response.
    pub async fn generate(&self, request: &GenerateRequest) -> Result<GenerateChunk, RelayError> {
        let response = self.send(request).await?;
        let body = response.text().await.map_err(|e| {
            RelayError::unavailable_from(format!("failed to read response body: {e}"), e)
        })?;
        let chunk: GenerateChunk = serde_json::from_str(&body).map_err(|e| {
            RelayError::protocol_from(format!("failed to parse daemon response: {e}"), e)
        })?;
        match chunk.error {
            Some(error) => Err(RelayError::unavailable(format!("daemon error: {error}"))),
            None => Ok(chunk),
        }
    }

    /// Sends a request and returns the response once a success status arrived.
    pub async fn send(&self, request: &GenerateRequest) -> Result<reqwest::Response, RelayError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| RelayError::unavailable_from(format!("HTTP request failed: {e}"), e))?;

        let status = response.status();
        debug!(status = %status, stream = request.stream, "daemon response received");

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ErrorResponse>(&body) {
            Ok(err) => format!("daemon returned {status}: {}", err.error),
            Err(_) => format!("daemon returned {status}: {body}"),
        };
        Err(RelayError::unavailable(message))
    }
}
