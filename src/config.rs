//! Configuration loading and validation.

use crate::error::{ConfigError, Result};
use crate::routing::RoutingConfig;
use anyhow::Context as _;
use std::path::Path;

/// Relaybot configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Data directory path.
    pub data_dir: std::path::PathBuf,

    /// Hook configuration file path.
    pub hooks_path: std::path::PathBuf,

    /// Gateway access settings.
    pub gateway: GatewayConfig,

    /// Task routing thresholds.
    pub routing: RoutingConfig,

    /// Dedup cache windows.
    pub dedup: DedupConfig,
}

/// Gateway authorization configuration.
#[derive(Debug, Clone, Default)]
pub struct GatewayConfig {
    /// Shared-secret token callers must present. None disables token auth.
    pub token: Option<String>,

    /// Comma-separated IP allowlist. Empty or absent means any IP.
    pub ip_allowlist: Option<String>,

    /// Group chat ids the bot may respond in. Empty means all groups.
    pub allowed_groups: Vec<String>,
}

/// Dedup and sent-message cache windows.
#[derive(Debug, Clone, Copy)]
pub struct DedupConfig {
    /// Inbound dedup TTL in seconds.
    pub ttl_secs: i64,

    /// Maximum tracked ids per chat scope.
    pub max_per_scope: usize,

    /// Sent-message cache TTL in seconds.
    pub sent_ttl_secs: i64,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 20 * 60,
            max_per_scope: 5000,
            sent_ttl_secs: 24 * 60 * 60,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        let data_dir = dirs::data_dir()
            .map(|d| d.join("relaybot"))
            .unwrap_or_else(|| std::path::PathBuf::from("./data"));

        // Ensure data directory exists
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("failed to create data directory: {}", data_dir.display()))?;

        let hooks_path = std::env::var("RELAYBOT_HOOKS_FILE")
            .map(std::path::PathBuf::from)
            .unwrap_or_else(|_| data_dir.join("hooks.json"));

        let gateway = GatewayConfig {
            token: std::env::var("RELAYBOT_GATEWAY_TOKEN").ok().filter(|t| !t.is_empty()),
            ip_allowlist: std::env::var("RELAYBOT_IP_ALLOWLIST").ok(),
            allowed_groups: std::env::var("RELAYBOT_ALLOWED_GROUPS")
                .map(|raw| {
                    raw.split(',')
                        .map(str::trim)
                        .filter(|id| !id.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
        };

        let routing = RoutingConfig {
            enabled: env_flag("RELAYBOT_BACKGROUND_TASKS", true)?,
            url_threshold: env_number("RELAYBOT_TASK_URL_THRESHOLD", 3)?,
            min_chars: env_number("RELAYBOT_TASK_MIN_CHARS", 500)?,
        };

        if routing.url_threshold == 0 {
            return Err(ConfigError::Invalid(
                "RELAYBOT_TASK_URL_THRESHOLD must be at least 1".into(),
            )
            .into());
        }

        let dedup = DedupConfig::default();

        Ok(Self {
            data_dir,
            hooks_path,
            gateway,
            routing,
            dedup,
        })
    }

    /// Load from a specific hooks file path, environment for the rest.
    pub fn load_with_hooks_path(path: &Path) -> Result<Self> {
        let mut config = Self::load()?;
        config.hooks_path = path.to_path_buf();
        Ok(config)
    }
}

fn env_flag(key: &str, default: bool) -> Result<bool> {
    match std::env::var(key) {
        Ok(raw) => match raw.trim() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => {
                Err(ConfigError::Invalid(format!("{key} must be a boolean, got {other:?}")).into())
            }
        },
        Err(_) => Ok(default),
    }
}

fn env_number<T: std::str::FromStr>(key: &str, default: T) -> Result<T> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("{key} must be a number, got {raw:?}")).into()),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_flag_parses_common_spellings() {
        // Safety: test-local variable names, no concurrent readers.
        unsafe { std::env::set_var("RELAYBOT_TEST_FLAG_ON", "yes") };
        unsafe { std::env::set_var("RELAYBOT_TEST_FLAG_OFF", "0") };

        assert!(env_flag("RELAYBOT_TEST_FLAG_ON", false).expect("flag should parse"));
        assert!(!env_flag("RELAYBOT_TEST_FLAG_OFF", true).expect("flag should parse"));
        assert!(env_flag("RELAYBOT_TEST_FLAG_ABSENT", true).expect("default should apply"));
    }

    #[test]
    fn env_flag_rejects_garbage() {
        unsafe { std::env::set_var("RELAYBOT_TEST_FLAG_BAD", "maybe") };

        let error = env_flag("RELAYBOT_TEST_FLAG_BAD", true).expect_err("garbage must fail");
        assert!(error.to_string().contains("must be a boolean"));
    }

    #[test]
    fn env_number_falls_back_to_default() {
        assert_eq!(env_number("RELAYBOT_TEST_NUM_ABSENT", 42usize).expect("default"), 42);
    }
}
