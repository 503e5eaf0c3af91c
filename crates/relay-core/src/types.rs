// SPDX-FileCopyrightText: 2026 Relay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Canonical types shared by every adapter: prompts, stream events, and results.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// One `{role, content}` entry of a structured prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptMessage {
    /// Free-form role, e.g. `user`, `assistant`, `system`.
    pub role: String,
    pub content: String,
}

impl PromptMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }
}

/// A single entry of a structured prompt.
///
/// Entries that are not role/content pairs are kept verbatim so that the
/// normalizer can degrade instead of failing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PromptEntry {
    Message(PromptMessage),
    Text(String),
    Other(serde_json::Value),
}

impl From<PromptMessage> for PromptEntry {
    fn from(message: PromptMessage) -> Self {
        Self::Message(message)
    }
}

/// A backend-neutral prompt: a plain string or an ordered list of entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Prompt {
    Text(String),
    Messages(Vec<PromptEntry>),
}

impl Prompt {
    /// Builds a structured prompt from role/content pairs, preserving order.
    pub fn messages<I>(messages: I) -> Self
    where
        I: IntoIterator<Item = PromptMessage>,
    {
        Self::Messages(messages.into_iter().map(PromptEntry::Message).collect())
    }
}

impl From<&str> for Prompt {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Prompt {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Vec<PromptMessage>> for Prompt {
    fn from(messages: Vec<PromptMessage>) -> Self {
        Self::messages(messages)
    }
}

/// Why a backend stopped generating.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum FinishReason {
    Stop,
    Length,
    ContentFilter,
    ToolCalls,
    Error,
    Other,
    Unknown,
}

/// Token accounting reported by a backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl Usage {
    /// Usage for backends that do not expose token accounting.
    pub const ZERO: Usage = Usage {
        prompt_tokens: 0,
        completion_tokens: 0,
    };
}

/// One event of the canonical incremental token stream.
///
/// A completed stream ends with exactly one [`StreamEvent::Finish`]; deltas are
/// never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum StreamEvent {
    /// A fragment of answer text.
    #[serde(rename_all = "camelCase")]
    TextDelta { text_delta: String },
    /// A fragment of reasoning text (only produced by the reasoning middleware).
    #[serde(rename_all = "camelCase")]
    ReasoningDelta { text_delta: String },
    /// Terminal event.
    #[serde(rename_all = "camelCase")]
    Finish {
        finish_reason: FinishReason,
        usage: Usage,
    },
}

impl StreamEvent {
    pub fn text(delta: impl Into<String>) -> Self {
        Self::TextDelta {
            text_delta: delta.into(),
        }
    }

    pub fn reasoning(delta: impl Into<String>) -> Self {
        Self::ReasoningDelta {
            text_delta: delta.into(),
        }
    }

    pub fn finish(finish_reason: FinishReason, usage: Usage) -> Self {
        Self::Finish {
            finish_reason,
            usage,
        }
    }

    pub fn is_finish(&self) -> bool {
        matches!(self, Self::Finish { .. })
    }
}

/// The request as it was issued, retained for diagnostics only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCall {
    pub prompt: Prompt,
    /// Backend name, model identifier, and any backend-specific settings.
    pub settings: serde_json::Value,
}

/// Canonical result of a one-shot generate call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResult {
    pub text: String,
    /// Extracted reasoning, set only when the reasoning middleware is applied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    pub finish_reason: FinishReason,
    pub usage: Usage,
    pub raw_call: RawCall,
}
