// SPDX-FileCopyrightText: 2026 Relay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Relay - a uniform front end over hosted, local and webhook model backends.
//!
//! This is the binary entry point. It loads configuration, builds the provider
//! registry and runs one request against a role.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use relay_config::RelayConfig;
use relay_registry::ProviderRegistry;

/// Relay - a uniform front end over hosted, local and webhook model backends.
#[derive(Parser, Debug)]
#[command(name = "relay", version, about, long_about = None)]
struct Cli {
    /// Configuration file to use instead of the XDG hierarchy.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a one-shot generation and print the result.
    Generate {
        /// Role to request (chat, chat-with-reasoning, title, artifact).
        #[arg(long, default_value = "chat")]
        role: String,
        /// Print the canonical result as JSON.
        #[arg(long)]
        json: bool,
        /// Plain text, or a JSON array of `{role, content}` messages.
        prompt: String,
    },
    /// Stream a generation, printing deltas as they arrive.
    Stream {
        /// Role to request (chat, chat-with-reasoning, title, artifact).
        #[arg(long, default_value = "chat")]
        role: String,
        /// Print one canonical stream event per line.
        #[arg(long)]
        json: bool,
        /// Plain text, or a JSON array of `{role, content}` messages.
        prompt: String,
    },
    /// Print the effective configuration with secrets redacted.
    Config,
}

/// Crates whose log targets follow the configured level.
const LOG_TARGETS: &[&str] = &[
    "relay",
    "relay_core",
    "relay_config",
    "relay_registry",
    "relay_openai",
    "relay_ollama",
    "relay_webhook",
];

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => relay_config::load_and_validate_path(path),
        None => relay_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            relay_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.log.level);

    if let Err(e) = run(cli.command, &config).await {
        eprintln!("relay: {e}");
        std::process::exit(1);
    }
}

async fn run(command: Commands, config: &RelayConfig) -> Result<(), commands::CommandError> {
    let mut stdout = std::io::stdout();
    let mut stderr = std::io::stderr();

    match command {
        Commands::Generate { role, json, prompt } => {
            let registry = ProviderRegistry::from_config(config)?;
            let prompt = commands::parse_prompt(&prompt);
            commands::generate(&registry, &role, prompt, json, &mut stdout, &mut stderr).await
        }
        Commands::Stream { role, json, prompt } => {
            let registry = ProviderRegistry::from_config(config)?;
            let prompt = commands::parse_prompt(&prompt);
            commands::stream(&registry, &role, prompt, json, &mut stdout, &mut stderr).await
        }
        Commands::Config => commands::print_config(config, &mut stdout),
    }
}

/// Initialize the tracing subscriber on stderr, honouring `RUST_LOG` when set.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let mut directives: Vec<String> = LOG_TARGETS
            .iter()
            .map(|target| format!("{target}={log_level}"))
            .collect();
        directives.push("warn".to_string());
        EnvFilter::new(directives.join(","))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
