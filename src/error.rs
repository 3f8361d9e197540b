//! Top-level error types for Relaybot.

use std::sync::Arc;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error enum wrapping domain-specific errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Runner(#[from] RunnerError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Configuration and hook-file loading errors.
///
/// A parse or schema failure is fatal to loading the hook set, never to
/// dispatch paths still holding a previously loaded set.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load config from {path}: {source}")]
    Load {
        path: String,
        source: Arc<std::io::Error>,
    },

    #[error("failed to parse hook config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid hook config: {0}")]
    Schema(String),

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Bounded-concurrency runner errors.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error("concurrency limit must be at least 1")]
    ZeroConcurrency,

    #[error("worker task failed to join: {0}")]
    Join(String),
}

/// Text-store backend errors.
///
/// The core never retries store failures; retry policy belongs to the
/// storage adapter behind the trait.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store backend unavailable: {0}")]
    Unavailable(String),

    #[error("invalid store key: {0}")]
    InvalidKey(String),

    #[error("store IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
