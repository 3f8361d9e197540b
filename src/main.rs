//! Relaybot CLI entry point.
//!
//! Reads JSON-lines events on stdin, runs each through the decision
//! pipeline, and prints one JSON outcome per line. This is the gateway's
//! debug surface; production transports feed the same pipeline.

use anyhow::Context as _;
use clap::Parser;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "relaybot")]
#[command(about = "Chat-bot gateway decision layer: dedup, access gating, routing, hooks")]
struct Cli {
    /// Path to the hook configuration file (defaults to the data dir)
    #[arg(long)]
    hooks: Option<std::path::PathBuf>,

    /// Gateway token to present, checked against RELAYBOT_GATEWAY_TOKEN
    #[arg(long)]
    token: Option<String>,

    /// Client IP to evaluate against the configured allowlist
    #[arg(long)]
    client_ip: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = match &cli.hooks {
        Some(path) => relaybot::config::Config::load_with_hooks_path(path)
            .with_context(|| format!("failed to load config with hooks from {}", path.display()))?,
        None => relaybot::config::Config::load()
            .with_context(|| "failed to load configuration from environment")?,
    };

    if !relaybot::pipeline::authorize_request(
        &config,
        cli.token.as_deref(),
        cli.client_ip.as_deref(),
    ) {
        // Deny without naming which check failed.
        anyhow::bail!("unauthorized");
    }

    let registry = match std::fs::read_to_string(&config.hooks_path) {
        Ok(raw) => {
            let registry = relaybot::hooks::HookRegistry::from_config(&raw).with_context(|| {
                format!("failed to parse hook config {}", config.hooks_path.display())
            })?;
            tracing::info!(
                path = %config.hooks_path.display(),
                count = registry.load().len(),
                "hook config loaded"
            );
            registry
        }
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!(path = %config.hooks_path.display(), "no hook config, starting empty");
            relaybot::hooks::HookRegistry::default()
        }
        Err(error) => {
            return Err(error).with_context(|| {
                format!("failed to read hook config {}", config.hooks_path.display())
            });
        }
    };

    let mut pipeline = relaybot::pipeline::Pipeline::new(&config, Arc::new(registry));

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    let mut lines = stdin.lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let event: relaybot::InboundEvent = match serde_json::from_str(line) {
            Ok(event) => event,
            Err(error) => {
                tracing::warn!(%error, "skipping malformed event line");
                continue;
            }
        };

        let outcome = pipeline.process(&event);
        let mut encoded = serde_json::to_vec(&outcome).context("failed to encode outcome")?;
        encoded.push(b'\n');
        stdout.write_all(&encoded).await?;
        stdout.flush().await?;
    }

    tracing::info!("input drained, shutting down");
    Ok(())
}
