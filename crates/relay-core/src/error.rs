// SPDX-FileCopyrightText: 2026 Relay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Relay provider layer.

use thiserror::Error;

/// The primary error type returned by model adapters and the provider registry.
///
/// Malformed lines inside a streamed webhook response are not represented here:
/// the stream decoder logs and skips them without surfacing an error.
#[derive(Debug, Error)]
pub enum RelayError {
    /// No adapter could be constructed from the supplied configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// The transport call could not be completed (network failure, non-success status).
    #[error("backend unavailable: {message}")]
    BackendUnavailable {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The backend answered, but the response could not be mapped to canonical shape.
    #[error("backend protocol error: {message}")]
    BackendProtocol {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A role name that the registry does not know.
    #[error("role not found: {role}")]
    RoleNotFound { role: String },
}

impl RelayError {
    /// A transport failure without an underlying error value (e.g. a non-success status).
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::BackendUnavailable {
            message: message.into(),
            source: None,
        }
    }

    /// A transport failure caused by `source`.
    pub fn unavailable_from<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::BackendUnavailable {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// A response that could not be mapped to canonical shape.
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::BackendProtocol {
            message: message.into(),
            source: None,
        }
    }

    /// A response that could not be mapped to canonical shape, caused by `source`.
    pub fn protocol_from<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::BackendProtocol {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}
