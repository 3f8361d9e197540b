//! Hook dispatch and the hot-reloadable hook registry.

use crate::InboundEvent;
use crate::error::ConfigError;
use crate::hooks::config::{Hook, HookAction, parse_hooks_config};
use crate::hooks::filter;
use arc_swap::ArcSwap;
use std::sync::Arc;

/// Match an event against a hook list and collect the actions of every
/// matching hook, in declaration order.
///
/// A hook fires iff it is enabled, its event equals the incoming event kind,
/// and every declared filter predicate matches. Hooks are evaluated
/// independently: no short-circuiting across hooks, no dedup of actions, and
/// the engine itself has no side effects.
pub fn dispatch_hooks(hooks: &[Hook], event: &InboundEvent) -> Vec<HookAction> {
    let mut actions = Vec::new();

    for hook in hooks {
        if !hook.enabled || hook.event != event.event {
            continue;
        }
        let filter_matches = hook
            .filter
            .as_ref()
            .is_none_or(|f| filter::matches_event(f, event));
        if !filter_matches {
            continue;
        }

        tracing::debug!(hook_id = %hook.id, action = %hook.action.kind(), "hook matched");
        actions.push(hook.action.clone());
    }

    actions
}

/// Hot-swappable hook set.
///
/// Dispatch paths load a snapshot per pass, so a reload never disturbs a
/// dispatch already in flight, and a failed reload leaves the previously
/// loaded set in place.
pub struct HookRegistry {
    hooks: ArcSwap<Vec<Hook>>,
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl HookRegistry {
    pub fn new(hooks: Vec<Hook>) -> Self {
        Self {
            hooks: ArcSwap::from_pointee(hooks),
        }
    }

    /// Parse a config body and install it as the initial hook set.
    pub fn from_config(raw: &str) -> Result<Self, ConfigError> {
        Ok(Self::new(parse_hooks_config(raw)?))
    }

    /// Current hook set snapshot.
    pub fn load(&self) -> Arc<Vec<Hook>> {
        self.hooks.load_full()
    }

    /// Replace the hook set wholesale.
    pub fn store(&self, hooks: Vec<Hook>) {
        self.hooks.store(Arc::new(hooks));
    }

    /// Parse and install a new config body. On parse failure the previous
    /// set stays active and the error is returned to the caller.
    pub fn reload_from(&self, raw: &str) -> Result<usize, ConfigError> {
        let hooks = parse_hooks_config(raw)?;
        let count = hooks.len();
        self.store(hooks);
        tracing::info!(count, "hook set reloaded");
        Ok(count)
    }

    /// Dispatch against the current snapshot.
    pub fn dispatch(&self, event: &InboundEvent) -> Vec<HookAction> {
        dispatch_hooks(&self.load(), event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::config::HookFilter;

    fn enqueue(text: &str) -> HookAction {
        HookAction::EnqueueTurn {
            text: text.to_string(),
            params: serde_json::Map::new(),
        }
    }

    fn hook(id: &str, event: &str, action: HookAction) -> Hook {
        Hook {
            id: id.to_string(),
            event: event.to_string(),
            enabled: true,
            filter: None,
            action,
        }
    }

    #[test]
    fn dispatch_matches_event_kind_exactly() {
        let hooks = vec![
            hook("a", "message", enqueue("from a")),
            hook("b", "tool_completed", enqueue("from b")),
        ];

        let actions = dispatch_hooks(&hooks, &InboundEvent::new("message"));
        assert_eq!(actions, vec![enqueue("from a")]);
    }

    #[test]
    fn dispatch_preserves_declaration_order() {
        let hooks = vec![
            hook("first", "message", enqueue("1")),
            hook("second", "message", enqueue("2")),
            hook("third", "message", enqueue("3")),
        ];

        let actions = dispatch_hooks(&hooks, &InboundEvent::new("message"));
        assert_eq!(actions, vec![enqueue("1"), enqueue("2"), enqueue("3")]);
    }

    #[test]
    fn disabled_hook_never_fires() {
        let mut disabled = hook("off", "message", enqueue("never"));
        disabled.enabled = false;

        let actions = dispatch_hooks(&[disabled], &InboundEvent::new("message"));
        assert!(actions.is_empty());
    }

    #[test]
    fn filtered_hook_requires_filter_match() {
        let mut filtered = hook("report", "message", enqueue("report action"));
        filtered.filter = Some(HookFilter {
            text_includes: Some("report".to_string()),
            ..Default::default()
        });

        let hit = InboundEvent::new("message").with_text("please report");
        let miss = InboundEvent::new("message").with_text("please help");

        assert_eq!(dispatch_hooks(std::slice::from_ref(&filtered), &hit).len(), 1);
        assert!(dispatch_hooks(&[filtered], &miss).is_empty());
    }

    #[test]
    fn duplicate_actions_are_not_deduplicated() {
        let hooks = vec![
            hook("a", "message", enqueue("same")),
            hook("b", "message", enqueue("same")),
        ];

        let actions = dispatch_hooks(&hooks, &InboundEvent::new("message"));
        assert_eq!(actions.len(), 2);
    }

    #[test]
    fn registry_keeps_previous_set_on_failed_reload() {
        let registry = HookRegistry::from_config(
            r#"[ { "id": "a", "event": "message", "action": { "type": "enqueue_turn", "text": "hi" } } ]"#,
        )
        .expect("initial config should parse");

        registry
            .reload_from("not json")
            .expect_err("broken reload must fail");

        // The original hook still dispatches.
        let actions = registry.dispatch(&InboundEvent::new("message"));
        assert_eq!(actions.len(), 1);
    }

    #[test]
    fn registry_reload_swaps_the_active_set() {
        let registry = HookRegistry::default();
        assert!(registry.dispatch(&InboundEvent::new("message")).is_empty());

        let count = registry
            .reload_from(
                r#"[ { "id": "a", "event": "message", "action": { "type": "enqueue_turn", "text": "hi" } } ]"#,
            )
            .expect("reload should parse");

        assert_eq!(count, 1);
        assert_eq!(registry.dispatch(&InboundEvent::new("message")).len(), 1);
    }
}
