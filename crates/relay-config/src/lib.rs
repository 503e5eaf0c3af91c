// SPDX-FileCopyrightText: 2026 Relay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Relay model provider layer.
//!
//! Provides TOML configuration parsing with strict validation (`deny_unknown_fields`),
//! XDG file hierarchy lookup, environment variable overrides, and diagnostic
//! error rendering with typo suggestions.
//!
//! # Usage
//!
//! ```no_run
//! use relay_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("provider: {}", config.provider.kind);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::Path;

use tracing::debug;

pub use diagnostic::{ConfigError, render_errors};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{ProviderKind, RelayConfig};

/// Load configuration from the XDG hierarchy and validate it.
///
/// On success, runs post-deserialization validation; on a Figment error,
/// converts it into diagnostics with typo suggestions.
pub fn load_and_validate() -> Result<RelayConfig, Vec<ConfigError>> {
    match loader::load_config() {
        Ok(config) => {
            validation::validate_config(&config)?;
            debug!(provider = %config.provider.kind, "configuration loaded");
            Ok(config)
        }
        Err(err) => {
            let toml_sources = collect_toml_sources();
            Err(diagnostic::figment_to_config_errors(err, &toml_sources))
        }
    }
}

/// Load configuration from an explicit file (plus env overrides) and validate it.
pub fn load_and_validate_path(path: &Path) -> Result<RelayConfig, Vec<ConfigError>> {
    if !path.is_file() {
        return Err(vec![ConfigError::Other(format!(
            "config file `{}` does not exist",
            path.display()
        ))]);
    }

    match loader::load_config_from_path(path) {
        Ok(config) => {
            validation::validate_config(&config)?;
            debug!(path = %path.display(), provider = %config.provider.kind, "configuration loaded");
            Ok(config)
        }
        Err(err) => {
            let sources = std::fs::read_to_string(path)
                .map(|content| vec![(path.display().to_string(), content)])
                .unwrap_or_default();
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Load configuration from a specific TOML string and validate it.
///
/// Useful for testing and explicit configuration.
pub fn load_and_validate_str(toml_content: &str) -> Result<RelayConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources = vec![("<inline>".to_string(), toml_content.to_string())];
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Collect TOML source file contents for error span resolution.
fn collect_toml_sources() -> Vec<(String, String)> {
    let mut sources = Vec::new();

    if let Ok(content) = std::fs::read_to_string(loader::LOCAL_CONFIG_PATH) {
        let path = std::env::current_dir()
            .map(|d| d.join(loader::LOCAL_CONFIG_PATH).display().to_string())
            .unwrap_or_else(|_| loader::LOCAL_CONFIG_PATH.to_string());
        sources.push((path, content));
    }

    if let Some(path) = loader::user_config_path()
        && let Ok(content) = std::fs::read_to_string(&path)
    {
        sources.push((path.display().to_string(), content));
    }

    if let Ok(content) = std::fs::read_to_string(loader::SYSTEM_CONFIG_PATH) {
        sources.push((loader::SYSTEM_CONFIG_PATH.to_string(), content));
    }

    sources
}
