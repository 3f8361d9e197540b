//! Task routing: inline vs background classification.
//!
//! A message is either handled synchronously in the current request or
//! deferred to a background job. Users can force either mode with a literal
//! prefix; otherwise heuristics over URL count and message length decide.

use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Literal prefix that forces background mode.
const BACKGROUND_PREFIX: &str = "/task ";

/// Literal prefix that forces inline mode.
const INLINE_PREFIX: &str = "now:";

/// Execution mode for an inbound message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskMode {
    Inline,
    Background,
}

impl TaskMode {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskMode::Inline => "inline",
            TaskMode::Background => "background",
        }
    }
}

impl std::fmt::Display for TaskMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A routing decision paired with the message text, with any override
/// prefix already stripped. Computed per message, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RouteDecision {
    pub mode: TaskMode,
    pub text: String,
}

/// Heuristic thresholds for background-task eligibility.
///
/// Both thresholds are inclusive: exactly at the boundary classifies as
/// background.
#[derive(Debug, Clone, Copy)]
pub struct RoutingConfig {
    /// When false the heuristics never fire and every message runs inline.
    pub enabled: bool,

    /// URL count at or above which a message becomes a background task.
    pub url_threshold: usize,

    /// Character length at or above which a message becomes a background task.
    pub min_chars: usize,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            url_threshold: 3,
            min_chars: 500,
        }
    }
}

/// Recognize a leading override token and strip it from the text.
///
/// `/task scan site` forces background mode; `now: quick check` forces
/// inline. Returns None when no override token is present, in which case the
/// caller falls through to [`decide_task_mode`].
pub fn extract_task_override(text: &str) -> Option<RouteDecision> {
    if let Some(rest) = text.strip_prefix(BACKGROUND_PREFIX) {
        return Some(RouteDecision {
            mode: TaskMode::Background,
            text: rest.trim().to_string(),
        });
    }
    if let Some(rest) = text.strip_prefix(INLINE_PREFIX) {
        return Some(RouteDecision {
            mode: TaskMode::Inline,
            text: rest.trim().to_string(),
        });
    }
    None
}

/// Heuristic classification for messages without an override prefix.
pub fn decide_task_mode(text: &str, config: &RoutingConfig) -> TaskMode {
    if !config.enabled {
        return TaskMode::Inline;
    }

    if count_urls(text) >= config.url_threshold || text.chars().count() >= config.min_chars {
        TaskMode::Background
    } else {
        TaskMode::Inline
    }
}

/// Count URL-like substrings in a message.
fn count_urls(text: &str) -> usize {
    static URL_PATTERN: LazyLock<regex::Regex> =
        LazyLock::new(|| regex::Regex::new(r"https?://\S+").expect("hardcoded regex"));

    URL_PATTERN.find_iter(text).count()
}
