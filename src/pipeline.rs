//! The event pipeline: dedup, access gating, routing, hook dispatch.
//!
//! One pipeline instance owns its caches and processes events serially;
//! that serialization is what makes the caches safe without interior
//! locking. Run one pipeline per event loop, or wrap a shared instance in a
//! mutex.

use crate::access;
use crate::config::Config;
use crate::dedup::{DedupCache, SentMessageCache};
use crate::hooks::{HookAction, HookRegistry};
use crate::routing::{self, RouteDecision, RoutingConfig, TaskMode};
use crate::InboundEvent;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;

/// What the decision layer concluded about one inbound event.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// Already seen inside the dedup window; drop silently.
    Duplicate,

    /// The bot authored this message itself; drop silently.
    SelfMessage,

    /// Chat failed the access gate. `reply` says whether an explicit
    /// denial reply is warranted.
    Unauthorized { reply: bool },

    /// Event passed every gate.
    Handled {
        mode: TaskMode,
        /// Message text with any override prefix stripped.
        text: String,
        actions: Vec<HookAction>,
    },
}

/// Decision layer for one gateway event loop.
pub struct Pipeline {
    dedup: DedupCache,
    sent: SentMessageCache,
    hooks: Arc<HookRegistry>,
    allowed_groups: HashSet<String>,
    routing: RoutingConfig,
}

impl Pipeline {
    pub fn new(config: &Config, hooks: Arc<HookRegistry>) -> Self {
        Self {
            dedup: DedupCache::new(config.dedup.ttl_secs, config.dedup.max_per_scope),
            sent: SentMessageCache::new(config.dedup.sent_ttl_secs),
            hooks,
            allowed_groups: config.gateway.allowed_groups.iter().cloned().collect(),
            routing: config.routing,
        }
    }

    /// Record a message id the bot just sent, so the echo of that message
    /// coming back from the platform is not re-processed.
    pub fn note_sent_message(&mut self, chat_id: &str, message_id: i64) {
        self.sent.mark_sent(chat_id, message_id);
    }

    /// Run one event through every gate and produce the decision.
    pub fn process(&mut self, event: &InboundEvent) -> Outcome {
        if let Some(message_id) = event.message_id {
            if self.sent.is_bot_message(&event.chat_id, message_id) {
                tracing::debug!(chat_id = %event.chat_id, message_id, "own message echoed back");
                return Outcome::SelfMessage;
            }
            if self.dedup.should_skip(&event.chat_id, message_id) {
                return Outcome::Duplicate;
            }
        }

        if !access::is_group_allowed(event.chat_kind, &event.chat_id, &self.allowed_groups) {
            let reply = access::should_reply_access_denied(
                event.chat_kind,
                event.bot_mentioned,
                event.reply_to_bot,
            );
            tracing::info!(chat_id = %event.chat_id, kind = %event.chat_kind, reply, "chat not allowed");
            return Outcome::Unauthorized { reply };
        }

        let text = event.text.clone().unwrap_or_default();
        let decision = routing::extract_task_override(&text).unwrap_or_else(|| RouteDecision {
            mode: routing::decide_task_mode(&text, &self.routing),
            text: text.clone(),
        });

        // Hooks match against the effective text so an override prefix
        // never leaks into filter predicates.
        let mut effective = event.clone();
        effective.text = Some(decision.text.clone());
        let actions = self.hooks.dispatch(&effective);

        tracing::debug!(
            chat_id = %event.chat_id,
            mode = %decision.mode,
            actions = actions.len(),
            "event handled"
        );

        Outcome::Handled {
            mode: decision.mode,
            text: decision.text,
            actions,
        }
    }

    /// Wipe both caches. Test isolation and full resets only.
    pub fn clear_caches(&mut self) {
        self.dedup.clear();
        self.sent.clear();
    }
}

/// Convenience used by tests and the CLI to decide gating for direct
/// gateway calls carrying a token header.
pub fn authorize_request(
    config: &Config,
    token: Option<&str>,
    client_ip: Option<&str>,
) -> bool {
    match &config.gateway.token {
        // No token configured: the gateway is open (trusted environment).
        None => true,
        Some(expected) => access::authorize_gateway_token(
            token.unwrap_or_default(),
            expected,
            config.gateway.ip_allowlist.as_deref(),
            client_ip,
        ),
    }
}
