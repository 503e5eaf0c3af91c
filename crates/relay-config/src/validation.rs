// SPDX-FileCopyrightText: 2026 Relay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that serde attributes cannot express: the
//! selected backend must have its required settings, URLs must be http(s),
//! and names must be non-empty.

use crate::diagnostic::ConfigError;
use crate::model::{ProviderKind, RelayConfig};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    match config.provider.kind {
        ProviderKind::Hosted => {
            let has_key = config
                .hosted
                .api_key
                .as_deref()
                .is_some_and(|key| !key.trim().is_empty());
            if !has_key {
                errors.push(ConfigError::Validation {
                    message: "hosted.api_key is required when provider.kind = \"hosted\" \
                              (set it in relay.toml, RELAY_HOSTED_API_KEY, or OPENAI_API_KEY)"
                        .to_string(),
                });
            }
        }
        ProviderKind::Webhook => {
            if config.webhook.url.is_none() {
                errors.push(ConfigError::Validation {
                    message: "webhook.url is required when provider.kind = \"webhook\""
                        .to_string(),
                });
            }
        }
        ProviderKind::Local => {}
    }

    check_url("hosted.base_url", &config.hosted.base_url, &mut errors);
    check_url("local.base_url", &config.local.base_url, &mut errors);
    if let Some(url) = &config.webhook.url {
        check_url("webhook.url", url, &mut errors);
    }

    check_not_empty("hosted.model", &config.hosted.model, &mut errors);
    check_not_empty("local.model", &config.local.model, &mut errors);
    check_not_empty("webhook.session_id", &config.webhook.session_id, &mut errors);

    let tag = &config.reasoning.tag;
    if tag.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "reasoning.tag must not be empty".to_string(),
        });
    } else if tag.contains(['<', '>', '/']) || tag.chars().any(char::is_whitespace) {
        errors.push(ConfigError::Validation {
            message: format!(
                "reasoning.tag `{tag}` must be a bare tag name without `<`, `>`, `/` or whitespace"
            ),
        });
    }

    if !LOG_LEVELS.contains(&config.log.level.to_ascii_lowercase().as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "log.level `{}` is not one of: {}",
                config.log.level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_url(key: &str, value: &str, errors: &mut Vec<ConfigError>) {
    let value = value.trim();
    let rest = value
        .strip_prefix("http://")
        .or_else(|| value.strip_prefix("https://"));
    match rest {
        Some(host) if !host.is_empty() && !host.starts_with('/') => {}
        _ => errors.push(ConfigError::Validation {
            message: format!("{key} `{value}` must be an http:// or https:// URL"),
        }),
    }
}

fn check_not_empty(key: &str, value: &str, errors: &mut Vec<ConfigError>) {
    if value.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: format!("{key} must not be empty"),
        });
    }
}
