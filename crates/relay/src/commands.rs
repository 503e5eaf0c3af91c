// SPDX-FileCopyrightText: 2026 Relay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Implementations of the `generate`, `stream` and `config` subcommands.
//!
//! Output goes to caller-supplied writers so the commands can be exercised
//! without a terminal. Answer text goes to `out`; reasoning goes to `aside`.

use std::io::Write;

use futures::StreamExt;
use relay_config::RelayConfig;
use relay_core::{Prompt, RelayError, StreamEvent};
use relay_registry::ProviderRegistry;
use thiserror::Error;
use tracing::debug;

/// Error raised by a subcommand.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Relay(#[from] RelayError),

    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Render(String),
}

/// Interprets a command-line prompt argument.
///
/// An argument that parses as a JSON array becomes a structured prompt;
/// anything else is sent as plain text.
pub fn parse_prompt(arg: &str) -> Prompt {
    if arg.trim_start().starts_with('[')
        && let Ok(prompt @ Prompt::Messages(_)) = serde_json::from_str::<Prompt>(arg)
    {
        return prompt;
    }
    Prompt::Text(arg.to_string())
}

/// Runs one generate call and prints the text, or the canonical result as JSON.
pub async fn generate(
    registry: &ProviderRegistry,
    role: &str,
    prompt: Prompt,
    json: bool,
    out: &mut impl Write,
    aside: &mut impl Write,
) -> Result<(), CommandError> {
    let adapter = registry.get_by_name(role)?;
    debug!(role, adapter = adapter.name(), "generate");
    let result = adapter.generate(prompt).await?;

    if json {
        let line = serde_json::to_string(&result)
            .map_err(|e| CommandError::Render(format!("failed to render result: {e}")))?;
        writeln!(out, "{line}")?;
    } else {
        if let Some(reasoning) = &result.reasoning {
            writeln!(aside, "{reasoning}")?;
        }
        writeln!(out, "{}", result.text)?;
    }
    Ok(())
}

/// Streams one call, printing deltas as they arrive or one JSON event per line.
pub async fn stream(
    registry: &ProviderRegistry,
    role: &str,
    prompt: Prompt,
    json: bool,
    out: &mut impl Write,
    aside: &mut impl Write,
) -> Result<(), CommandError> {
    let adapter = registry.get_by_name(role)?;
    debug!(role, adapter = adapter.name(), "stream");
    let mut events = adapter.stream(prompt);

    while let Some(event) = events.next().await {
        let event = event?;
        if json {
            let line = serde_json::to_string(&event)
                .map_err(|e| CommandError::Render(format!("failed to render event: {e}")))?;
            writeln!(out, "{line}")?;
            continue;
        }
        match event {
            StreamEvent::TextDelta { text_delta } => {
                write!(out, "{text_delta}")?;
                out.flush()?;
            }
            StreamEvent::ReasoningDelta { text_delta } => {
                write!(aside, "{text_delta}")?;
                aside.flush()?;
            }
            StreamEvent::Finish {
                finish_reason,
                usage,
            } => {
                writeln!(out)?;
                debug!(
                    %finish_reason,
                    prompt_tokens = usage.prompt_tokens,
                    completion_tokens = usage.completion_tokens,
                    "stream finished"
                );
            }
        }
    }
    Ok(())
}

/// Prints the effective configuration with secrets redacted.
pub fn print_config(config: &RelayConfig, out: &mut impl Write) -> Result<(), CommandError> {
    let rendered = config
        .to_redacted_toml()
        .map_err(|e| CommandError::Render(format!("failed to render configuration: {e}")))?;
    write!(out, "{rendered}")?;
    Ok(())
}
