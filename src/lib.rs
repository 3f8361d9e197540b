//! Relaybot: the decision layer of a chat-bot gateway.
//!
//! Inbound events flow through deduplication, access gating, task routing,
//! and hook dispatch before any downstream executor (LLM turn, subagent)
//! sees them. This crate owns that decision layer; message transport, prompt
//! content, and storage backends are external collaborators.

pub mod access;
pub mod config;
pub mod dedup;
pub mod error;
pub mod hooks;
pub mod pipeline;
pub mod routing;
pub mod runner;
pub mod store;

pub use error::{Error, Result};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Kind of chat an event originated from.
///
/// Group gating applies to `Group` and `Supergroup`; direct chats and
/// broadcast channels are never gated by the group allowlist.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChatKind {
    Private,
    Group,
    Supergroup,
    Channel,
}

impl ChatKind {
    pub fn is_group(self) -> bool {
        matches!(self, ChatKind::Group | ChatKind::Supergroup)
    }
}

impl std::fmt::Display for ChatKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChatKind::Private => write!(f, "private"),
            ChatKind::Group => write!(f, "group"),
            ChatKind::Supergroup => write!(f, "supergroup"),
            ChatKind::Channel => write!(f, "channel"),
        }
    }
}

/// Inbound event from the messaging surface or a tool completion.
///
/// The shape is open-ended: hook filters only inspect the fields their
/// declared predicates name, and anything the gateway passes through beyond
/// the known fields lands in `extra`. Field names follow the external JSON
/// contract (camelCase), which predates this crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundEvent {
    /// Event kind, e.g. `"message"`, `"tool_completed"`, `"admin_command"`.
    pub event: String,

    /// Chat or conversation identifier. Also the dedup scope.
    #[serde(default)]
    pub chat_id: String,

    #[serde(default = "default_chat_kind")]
    pub chat_kind: ChatKind,

    /// Platform message identifier, present for message events.
    #[serde(default)]
    pub message_id: Option<i64>,

    #[serde(default)]
    pub text: Option<String>,

    /// Tool name, present for tool lifecycle events.
    #[serde(default)]
    pub tool_name: Option<String>,

    /// Whether the bot was explicitly mentioned in the message.
    #[serde(default)]
    pub bot_mentioned: bool,

    /// Whether the message is a reply to one of the bot's own messages.
    #[serde(default)]
    pub reply_to_bot: bool,

    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

fn default_chat_kind() -> ChatKind {
    ChatKind::Private
}

impl InboundEvent {
    /// Build a bare event, useful for tests and synthetic dispatches.
    pub fn new(event: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            chat_id: String::new(),
            chat_kind: ChatKind::Private,
            message_id: None,
            text: None,
            tool_name: None,
            bot_mentioned: false,
            reply_to_bot: false,
            extra: HashMap::new(),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_tool_name(mut self, tool_name: impl Into<String>) -> Self {
        self.tool_name = Some(tool_name.into());
        self
    }
}
