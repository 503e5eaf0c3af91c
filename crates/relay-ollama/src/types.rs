// SPDX-FileCopyrightText: 2026 Relay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the daemon's `/api/generate` endpoint.

use serde::{Deserialize, Serialize};

/// Request body for `POST /api/generate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerateRequest {
    pub model: String,
    /// The normalized flat prompt.
    pub prompt: String,
    pub stream: bool,
}

/// A non-streaming response, or one NDJSON line of a streaming response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateChunk {
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub done: bool,
    /// Set instead of `response` when the daemon fails mid-request.
    #[serde(default)]
    pub error: Option<String>,
}

/// Error body returned with non-success statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
