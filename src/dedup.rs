//! Inbound message deduplication and sent-message tracking.
//!
//! Both caches are sliding-window sets keyed by (scope, id), where the scope
//! is typically a chat identifier. They carry no interior locking: the event
//! pipeline owns them and serializes access per scope. Running multiple
//! pipelines against one instance requires an external mutex.

use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, VecDeque};

/// Default inbound dedup window.
pub const DEFAULT_DEDUP_TTL_SECS: i64 = 20 * 60;

/// Default per-scope id capacity for the inbound dedup cache.
pub const DEFAULT_MAX_PER_SCOPE: usize = 5000;

/// Default sent-message tracking window.
pub const DEFAULT_SENT_TTL_SECS: i64 = 24 * 60 * 60;

/// Per-scope id set with insertion order retained for capacity eviction.
#[derive(Debug, Default)]
struct ScopeEntries {
    by_id: HashMap<i64, DateTime<Utc>>,
    order: VecDeque<i64>,
}

impl ScopeEntries {
    fn evict_expired(&mut self, ttl: Duration, now: DateTime<Utc>) {
        let by_id = &mut self.by_id;
        self.order.retain(|id| {
            let live = by_id
                .get(id)
                .is_some_and(|seen| now.signed_duration_since(*seen) < ttl);
            if !live {
                by_id.remove(id);
            }
            live
        });
    }

    fn evict_overflow(&mut self, max: usize) {
        while self.by_id.len() > max {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.by_id.remove(&oldest);
        }
    }

    fn record(&mut self, id: i64, now: DateTime<Utc>) {
        if self.by_id.insert(id, now).is_none() {
            self.order.push_back(id);
        }
    }
}

/// Sliding-window duplicate detector for inbound message ids.
///
/// An id recorded at time T reads as a duplicate until T + TTL; per-scope
/// entry count never exceeds the configured maximum (oldest inserted
/// evicted first).
#[derive(Debug)]
pub struct DedupCache {
    ttl: Duration,
    max_per_scope: usize,
    scopes: HashMap<String, ScopeEntries>,
}

impl Default for DedupCache {
    fn default() -> Self {
        Self::new(DEFAULT_DEDUP_TTL_SECS, DEFAULT_MAX_PER_SCOPE)
    }
}

impl DedupCache {
    pub fn new(ttl_secs: i64, max_per_scope: usize) -> Self {
        Self {
            ttl: Duration::seconds(ttl_secs),
            max_per_scope,
            scopes: HashMap::new(),
        }
    }

    /// Check-and-record for one event. Returns true when the (scope, id)
    /// pair was already seen inside the TTL window and the caller should
    /// drop the event.
    pub fn should_skip(&mut self, scope: &str, id: i64) -> bool {
        self.should_skip_at(scope, id, Utc::now())
    }

    /// Clock-injected variant of [`should_skip`](Self::should_skip).
    pub fn should_skip_at(&mut self, scope: &str, id: i64, now: DateTime<Utc>) -> bool {
        let scope = scope.trim();
        if scope.is_empty() {
            // An event without a scope can't be correlated; never dedup it
            // and never record state for it.
            return false;
        }

        let entries = self.scopes.entry(scope.to_string()).or_default();
        entries.evict_expired(self.ttl, now);

        if entries.by_id.contains_key(&id) {
            tracing::debug!(scope, id, "duplicate event dropped");
            return true;
        }

        entries.record(id, now);
        entries.evict_overflow(self.max_per_scope);
        false
    }

    /// Number of live entries for a scope. Diagnostic/test accessor.
    pub fn scope_len(&self, scope: &str) -> usize {
        self.scopes.get(scope.trim()).map_or(0, |e| e.by_id.len())
    }

    /// Wipe all scopes. For test isolation and full resets, not for
    /// production per-scope invalidation.
    pub fn clear(&mut self) {
        self.scopes.clear();
    }
}

/// Tracks message ids the bot itself produced, so the pipeline can tell
/// bot-authored messages apart from user messages and avoid re-processing
/// its own output.
///
/// Expired entries are evicted on every call rather than only once a scope
/// grows past a trigger size, so stale ids never linger in the set.
#[derive(Debug)]
pub struct SentMessageCache {
    ttl: Duration,
    scopes: HashMap<String, ScopeEntries>,
}

impl Default for SentMessageCache {
    fn default() -> Self {
        Self::new(DEFAULT_SENT_TTL_SECS)
    }
}

impl SentMessageCache {
    pub fn new(ttl_secs: i64) -> Self {
        Self {
            ttl: Duration::seconds(ttl_secs),
            scopes: HashMap::new(),
        }
    }

    /// Record a message id the bot just sent.
    pub fn mark_sent(&mut self, scope: &str, id: i64) {
        self.mark_sent_at(scope, id, Utc::now());
    }

    pub fn mark_sent_at(&mut self, scope: &str, id: i64, now: DateTime<Utc>) {
        let scope = scope.trim();
        if scope.is_empty() {
            return;
        }
        let entries = self.scopes.entry(scope.to_string()).or_default();
        entries.evict_expired(self.ttl, now);
        entries.record(id, now);
    }

    /// Whether the bot authored this message inside the tracking window.
    pub fn is_bot_message(&mut self, scope: &str, id: i64) -> bool {
        self.is_bot_message_at(scope, id, Utc::now())
    }

    pub fn is_bot_message_at(&mut self, scope: &str, id: i64, now: DateTime<Utc>) -> bool {
        let scope = scope.trim();
        if scope.is_empty() {
            return false;
        }
        let Some(entries) = self.scopes.get_mut(scope) else {
            return false;
        };
        entries.evict_expired(self.ttl, now);
        entries.by_id.contains_key(&id)
    }

    pub fn clear(&mut self) {
        self.scopes.clear();
    }
}
