// SPDX-FileCopyrightText: 2026 Relay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./relay.toml` > `~/.config/relay/relay.toml` > `/etc/relay/relay.toml`
//! with environment variable overrides via `RELAY_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::RelayConfig;

/// Top-level sections that `RELAY_<SECTION>_<KEY>` variables map into.
const SECTIONS: &[&str] = &["provider", "hosted", "local", "webhook", "reasoning", "log"];

/// System-wide configuration file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/relay/relay.toml";

/// Configuration file in the working directory.
pub const LOCAL_CONFIG_PATH: &str = "relay.toml";

/// The user configuration file under the XDG config directory, if one exists.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("relay/relay.toml"))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `OPENAI_API_KEY` as `hosted.api_key`
/// 3. `/etc/relay/relay.toml` (system-wide)
/// 4. `~/.config/relay/relay.toml` (user XDG config)
/// 5. `./relay.toml` (local directory)
/// 6. `RELAY_*` environment variables
pub fn load_config() -> Result<RelayConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no environment).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<RelayConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RelayConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<RelayConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RelayConfig::default()))
        .merge(api_key_fallback())
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for hierarchy loading (exposed for diagnostic use).
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(RelayConfig::default()))
        .merge(api_key_fallback())
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_PATH))
        .merge(env_provider())
}

/// The conventional hosted-API credential variable, below any file setting.
fn api_key_fallback() -> Env {
    Env::raw()
        .only(&["OPENAI_API_KEY"])
        .map(|_| "hosted.api_key".into())
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Only the first underscore after the section name becomes a dot, so
/// `RELAY_WEBHOOK_SESSION_ID` maps to `webhook.session_id`, not `webhook.session.id`.
fn env_provider() -> Env {
    Env::prefixed("RELAY_").map(|key| map_env_key(key.as_str()).into())
}

fn map_env_key(key: &str) -> String {
    // Figment hands over the key with its original (upper) case.
    let key = key.to_ascii_lowercase();
    for section in SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key
}
