// SPDX-FileCopyrightText: 2026 Relay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Model adapter trait for text-generation backends (hosted API, local daemon, webhook).

use std::pin::Pin;

use async_trait::async_trait;
use futures_core::Stream;

use crate::error::RelayError;
use crate::types::{GenerateResult, Prompt, StreamEvent};

/// A lazy, forward-only sequence of canonical stream events.
///
/// Nothing is sent to the backend until the stream is first polled. Dropping
/// the stream drops the underlying response and releases its connection.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent, RelayError>> + Send>>;

/// The capability contract shared by every backend.
///
/// Adapters never retry and never fall back to another backend. A failed
/// stream yields one `Err` item and then ends, without a `Finish` event.
#[async_trait]
pub trait ModelAdapter: Send + Sync + 'static {
    /// Returns the human-readable backend name.
    fn name(&self) -> &str;

    /// Returns the model identifier requests are issued against.
    fn model_id(&self) -> &str;

    /// Sends the prompt and waits for the complete result.
    async fn generate(&self, prompt: Prompt) -> Result<GenerateResult, RelayError>;

    /// Sends the prompt and returns the canonical event stream.
    fn stream(&self, prompt: Prompt) -> EventStream;
}
