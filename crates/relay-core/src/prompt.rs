// SPDX-FileCopyrightText: 2026 Relay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prompt normalization for backends that take a flat string or plain chat messages.

use crate::types::{Prompt, PromptEntry, PromptMessage};

/// Flattens a prompt into a single string.
///
/// Role/content entries render as `role: content`, bare strings as themselves,
/// and anything else as its JSON text. Entries are joined with `\n` in order.
/// Never fails.
pub fn normalize(prompt: &Prompt) -> String {
    match prompt {
        Prompt::Text(text) => text.clone(),
        Prompt::Messages(entries) => entries
            .iter()
            .map(render_entry)
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

/// Converts a prompt into role-tagged chat messages.
///
/// A plain string becomes one `user` message; entries that are not role/content
/// pairs become `user` messages carrying their rendered text.
pub fn to_chat_messages(prompt: &Prompt) -> Vec<PromptMessage> {
    match prompt {
        Prompt::Text(text) => vec![PromptMessage::user(text.clone())],
        Prompt::Messages(entries) => entries
            .iter()
            .map(|entry| match entry {
                PromptEntry::Message(message) => message.clone(),
                other => PromptMessage::user(render_entry(other)),
            })
            .collect(),
    }
}

fn render_entry(entry: &PromptEntry) -> String {
    match entry {
        PromptEntry::Message(message) => format!("{}: {}", message.role, message.content),
        PromptEntry::Text(text) => text.clone(),
        // Serializing a `Value` cannot fail; fall back to the debug dump regardless.
        PromptEntry::Other(value) => {
            serde_json::to_string(value).unwrap_or_else(|_| format!("{value:?}"))
        }
    }
}
