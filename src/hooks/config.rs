//! Hook configuration parsing.
//!
//! Hooks arrive as an external JSON array, typically written by hand and
//! edited live, so schema violations are reported with the hook's position
//! and never silently dropped: a broken hook file must not silently disable
//! routing.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A declarative rule binding an event pattern and filter to an action.
///
/// Immutable once parsed for the duration of a dispatch pass; the engine
/// treats the hook list as read-only input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hook {
    pub id: String,

    /// Event kind this hook listens for, compared by exact match.
    pub event: String,

    /// Disabled hooks stay in the config but never fire.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<HookFilter>,

    pub action: HookAction,
}

fn default_enabled() -> bool {
    true
}

/// Optional filter predicates, combined by logical AND over the ones
/// present. Field names follow the external camelCase JSON contract.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct HookFilter {
    /// Substring the event text must contain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_includes: Option<String>,

    /// Exact tool name the event must carry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,

    /// Inclusive lower bound on event text length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_text_len: Option<usize>,

    /// Inclusive upper bound on event text length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_text_len: Option<usize>,
}

/// Typed instruction emitted by the hook engine for a downstream executor.
///
/// `Unknown` passes unrecognized action kinds through untouched so a newer
/// config keeps loading on an older binary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HookAction {
    /// Enqueue a conversational turn with the given text.
    EnqueueTurn {
        text: String,
        #[serde(flatten)]
        params: serde_json::Map<String, Value>,
    },
    /// Spawn a subagent with the given prompt.
    SpawnSubagent {
        prompt: String,
        #[serde(flatten)]
        params: serde_json::Map<String, Value>,
    },
    /// Unrecognized action kind, carried through for forward compatibility.
    #[serde(untagged)]
    Unknown(Value),
}

impl HookAction {
    /// Action kinds this binary knows how to execute. An `Unknown` action
    /// carrying one of these names is a schema violation, not forward
    /// compatibility.
    pub const KNOWN_KINDS: [&'static str; 2] = ["enqueue_turn", "spawn_subagent"];

    /// Action kind as it appears in config, for logging.
    pub fn kind(&self) -> &str {
        match self {
            HookAction::EnqueueTurn { .. } => "enqueue_turn",
            HookAction::SpawnSubagent { .. } => "spawn_subagent",
            HookAction::Unknown(value) => value
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or("unknown"),
        }
    }
}

/// Parse a hook configuration file body into an ordered hook list.
///
/// The input must be a JSON array; each element needs at least `id`,
/// `event`, and `action`. `enabled` defaults to true. The caller decides
/// whether a failure is fatal at startup or ignorable on reload.
pub fn parse_hooks_config(raw: &str) -> Result<Vec<Hook>, ConfigError> {
    let values: Value = serde_json::from_str(raw)?;

    let Value::Array(entries) = values else {
        return Err(ConfigError::Schema(format!(
            "hook config must be a JSON array, got {}",
            json_kind(&values)
        )));
    };

    let mut hooks = Vec::with_capacity(entries.len());
    for (position, entry) in entries.into_iter().enumerate() {
        for required in ["id", "event", "action"] {
            if entry.get(required).is_none() {
                return Err(ConfigError::Schema(format!(
                    "hook at index {position} is missing required field `{required}`"
                )));
            }
        }

        let hook: Hook = serde_json::from_value(entry).map_err(|error| {
            ConfigError::Schema(format!("hook at index {position} is invalid: {error}"))
        })?;

        // A known action kind that failed to deserialize falls through to
        // the Unknown passthrough; surface it as the schema error it is
        // instead of loading an action no executor can run.
        if let HookAction::Unknown(value) = &hook.action {
            match value.get("type").and_then(Value::as_str) {
                None => {
                    return Err(ConfigError::Schema(format!(
                        "hook at index {position} has an action without a `type` field"
                    )));
                }
                Some(kind) if HookAction::KNOWN_KINDS.contains(&kind) => {
                    return Err(ConfigError::Schema(format!(
                        "hook at index {position} has a malformed `{kind}` action"
                    )));
                }
                Some(_) => {}
            }
        }

        hooks.push(hook);
    }

    Ok(hooks)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
