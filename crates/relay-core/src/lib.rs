// SPDX-FileCopyrightText: 2026 Relay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Relay model provider layer.
//!
//! This crate provides the backend-neutral pieces every adapter builds on:
//! the [`ModelAdapter`] trait, canonical prompt/stream/result types, the
//! prompt normalizer, the line-oriented stream decoder, and the reasoning
//! extraction middleware.

pub mod collect;
pub mod decoder;
pub mod error;
pub mod prompt;
pub mod reasoning;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use collect::{StreamSummary, collect_stream};
pub use error::RelayError;
pub use reasoning::{DEFAULT_REASONING_TAG, ReasoningAdapter};
pub use traits::{EventStream, ModelAdapter};
pub use types::{
    FinishReason, GenerateResult, Prompt, PromptEntry, PromptMessage, RawCall, StreamEvent, Usage,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relay_error_has_all_variants() {
        let _config = RelayError::Config("test".into());
        let _unavailable = RelayError::unavailable("test");
        let _protocol = RelayError::protocol_from("test", std::io::Error::other("test"));
        let _role = RelayError::RoleNotFound {
            role: "test".into(),
        };
    }

    #[test]
    fn error_source_is_preserved() {
        use std::error::Error;

        let err = RelayError::unavailable_from("connect failed", std::io::Error::other("refused"));
        assert_eq!(err.to_string(), "backend unavailable: connect failed");
        assert_eq!(err.source().unwrap().to_string(), "refused");
    }

    #[test]
    fn finish_reason_round_trips_through_strings() {
        use std::str::FromStr;

        let variants = [
            FinishReason::Stop,
            FinishReason::Length,
            FinishReason::ContentFilter,
            FinishReason::ToolCalls,
            FinishReason::Error,
            FinishReason::Other,
            FinishReason::Unknown,
        ];
        for variant in &variants {
            let s = variant.to_string();
            let parsed = FinishReason::from_str(&s).expect("should parse back");
            assert_eq!(*variant, parsed);
            assert_eq!(serde_json::to_value(variant).unwrap(), serde_json::json!(s));
        }
        assert_eq!(FinishReason::ContentFilter.to_string(), "content-filter");
    }

    #[test]
    fn stream_events_serialize_in_canonical_shape() {
        let delta = serde_json::to_value(StreamEvent::text("he")).unwrap();
        assert_eq!(delta, serde_json::json!({"type": "text-delta", "textDelta": "he"}));

        let reasoning = serde_json::to_value(StreamEvent::reasoning("hm")).unwrap();
        assert_eq!(
            reasoning,
            serde_json::json!({"type": "reasoning-delta", "textDelta": "hm"})
        );

        let finish = serde_json::to_value(StreamEvent::finish(
            FinishReason::Stop,
            Usage {
                prompt_tokens: 3,
                completion_tokens: 5,
            },
        ))
        .unwrap();
        assert_eq!(
            finish,
            serde_json::json!({
                "type": "finish",
                "finishReason": "stop",
                "usage": {"promptTokens": 3, "completionTokens": 5}
            })
        );
    }

    #[test]
    fn prompt_deserializes_from_string_or_list() {
        let text: Prompt = serde_json::from_str("\"hi\"").unwrap();
        assert_eq!(text, Prompt::from("hi"));

        let list: Prompt =
            serde_json::from_str(r#"[{"role":"user","content":"hi"}]"#).unwrap();
        assert_eq!(list, Prompt::messages([PromptMessage::user("hi")]));
    }

    #[test]
    fn all_trait_modules_are_exported() {
        fn _assert_model_adapter<T: ModelAdapter>() {}
        _assert_model_adapter::<ReasoningAdapter>();
    }
}
