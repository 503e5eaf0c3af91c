// SPDX-FileCopyrightText: 2026 Relay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Draining a canonical stream into its accumulated content.

use futures::StreamExt;

use crate::error::RelayError;
use crate::traits::EventStream;
use crate::types::{FinishReason, StreamEvent, Usage};

/// Everything a finished stream carried, accumulated per channel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamSummary {
    pub text: String,
    pub reasoning: String,
    pub deltas: usize,
    /// `None` if the stream ended without a terminal event.
    pub finish: Option<(FinishReason, Usage)>,
}

/// Consumes the stream to the end, stopping at the first error.
pub async fn collect_stream(mut events: EventStream) -> Result<StreamSummary, RelayError> {
    let mut summary = StreamSummary::default();

    while let Some(event) = events.next().await {
        match event? {
            StreamEvent::TextDelta { text_delta } => {
                summary.deltas += 1;
                summary.text.push_str(&text_delta);
            }
            StreamEvent::ReasoningDelta { text_delta } => {
                summary.deltas += 1;
                summary.reasoning.push_str(&text_delta);
            }
            StreamEvent::Finish {
                finish_reason,
                usage,
            } => {
                summary.finish = Some((finish_reason, usage));
            }
        }
    }

    Ok(summary)
}
