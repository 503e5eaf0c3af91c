// SPDX-FileCopyrightText: 2026 Relay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Relay provider layer.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Placeholder written over secrets when the configuration is displayed.
pub const REDACTED: &str = "********";

/// Top-level Relay configuration.
///
/// Constructed once at startup and passed by reference to the provider
/// registry. All sections are optional and default to a local daemon setup.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RelayConfig {
    /// Which backend serves every role.
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Hosted (OpenAI-compatible) API settings.
    #[serde(default)]
    pub hosted: HostedConfig,

    /// Local generation daemon settings.
    #[serde(default)]
    pub local: LocalConfig,

    /// Webhook backend settings.
    #[serde(default)]
    pub webhook: WebhookConfig,

    /// Reasoning extraction settings for the `chat-with-reasoning` role.
    #[serde(default)]
    pub reasoning: ReasoningConfig,

    /// Logging settings.
    #[serde(default)]
    pub log: LogConfig,
}

impl RelayConfig {
    /// Returns a copy with credentials and header values replaced by [`REDACTED`].
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if config.hosted.api_key.is_some() {
            config.hosted.api_key = Some(REDACTED.to_string());
        }
        for value in config.webhook.headers.values_mut() {
            *value = REDACTED.to_string();
        }
        config
    }

    /// Renders the redacted configuration as TOML.
    pub fn to_redacted_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(&self.redacted())
    }
}

/// The closed set of backends.
///
/// `openai` and `ollama` are accepted as aliases because that is how the
/// provider picker persists its choice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[serde(alias = "openai")]
    Hosted,
    #[default]
    #[serde(alias = "ollama")]
    Local,
    Webhook,
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderKind::Hosted => write!(f, "hosted"),
            ProviderKind::Local => write!(f, "local"),
            ProviderKind::Webhook => write!(f, "webhook"),
        }
    }
}

/// Provider selection.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    #[serde(default)]
    pub kind: ProviderKind,
}

/// Hosted API configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HostedConfig {
    /// API credential, passed through as a bearer token. Falls back to `OPENAI_API_KEY`.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL of an OpenAI-compatible API.
    #[serde(default = "default_hosted_base_url")]
    pub base_url: String,

    /// Model identifier requests are issued against.
    #[serde(default = "default_hosted_model")]
    pub model: String,

    /// Optional organization header.
    #[serde(default)]
    pub organization: Option<String>,
}

impl Default for HostedConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_hosted_base_url(),
            model: default_hosted_model(),
            organization: None,
        }
    }
}

fn default_hosted_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_hosted_model() -> String {
    "gpt-4o-mini".to_string()
}

/// Local generation daemon configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LocalConfig {
    /// Base URL of the daemon.
    #[serde(default = "default_local_base_url")]
    pub base_url: String,

    /// Model name passed with every request.
    #[serde(default = "default_local_model")]
    pub model: String,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            base_url: default_local_base_url(),
            model: default_local_model(),
        }
    }
}

fn default_local_base_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_local_model() -> String {
    "llama3.2".to_string()
}

/// Webhook backend configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WebhookConfig {
    /// Endpoint receiving the POST. Required when the webhook provider is selected.
    #[serde(default)]
    pub url: Option<String>,

    /// Fixed session identifier sent with every request.
    #[serde(default = "default_session_id")]
    pub session_id: String,

    /// Extra headers sent with every request.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            url: None,
            session_id: default_session_id(),
            headers: BTreeMap::new(),
        }
    }
}

fn default_session_id() -> String {
    "relay".to_string()
}

/// Reasoning extraction configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ReasoningConfig {
    /// Tag name; `think` matches `<think>` ... `</think>`.
    #[serde(default = "default_reasoning_tag")]
    pub tag: String,
}

impl Default for ReasoningConfig {
    fn default() -> Self {
        Self {
            tag: default_reasoning_tag(),
        }
    }
}

fn default_reasoning_tag() -> String {
    "think".to_string()
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Logging level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
