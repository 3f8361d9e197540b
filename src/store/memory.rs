//! In-memory text store.
//!
//! Backs tests and ephemeral sessions; also the reference implementation of
//! the append/list semantics every backend must match.

use crate::error::Result;
use crate::store::{AppendOptions, PutOptions, TextStore, join_appended};
use std::collections::BTreeMap;
use tokio::sync::RwLock;

/// Entry payload: text plus the optional content type hint.
#[derive(Debug, Clone)]
struct Entry {
    text: String,
    content_type: Option<String>,
}

/// Map-backed store. Share behind an Arc; the interior lock serializes access.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: RwLock<BTreeMap<String, Entry>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Content type hint recorded for a key, when the put provided one.
    pub async fn content_type(&self, key: &str) -> Option<String> {
        self.entries
            .read()
            .await
            .get(key)
            .and_then(|e| e.content_type.clone())
    }
}

impl TextStore for InMemoryStore {
    async fn get_text(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().await.get(key).map(|e| e.text.clone()))
    }

    async fn put_text(&self, key: &str, text: &str, options: PutOptions) -> Result<()> {
        self.entries.write().await.insert(
            key.to_string(),
            Entry {
                text: text.to_string(),
                content_type: options.content_type,
            },
        );
        Ok(())
    }

    async fn append_text(&self, key: &str, text: &str, options: AppendOptions) -> Result<()> {
        let mut entries = self.entries.write().await;
        let existing = entries.get(key).cloned();
        let joined = join_appended(
            existing.as_ref().map(|e| e.text.as_str()),
            text,
            &options.separator,
        );
        let content_type = existing.and_then(|e| e.content_type);
        entries.insert(
            key.to_string(),
            Entry {
                text: joined,
                content_type,
            },
        );
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(self
            .entries
            .read()
            .await
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let store = InMemoryStore::new();

        store
            .put_text("memory/2026-08-28.md", "note", PutOptions::default())
            .await
            .expect("put should succeed");

        let text = store
            .get_text("memory/2026-08-28.md")
            .await
            .expect("get should succeed");
        assert_eq!(text.as_deref(), Some("note"));
    }

    #[tokio::test]
    async fn content_type_hint_is_recorded_and_survives_append() {
        let store = InMemoryStore::new();

        store
            .put_text(
                "memory/today.md",
                "note",
                PutOptions {
                    content_type: Some("text/markdown".to_string()),
                },
            )
            .await
            .expect("put should succeed");
        assert_eq!(
            store.content_type("memory/today.md").await.as_deref(),
            Some("text/markdown")
        );

        store
            .append_text("memory/today.md", "more", AppendOptions::default())
            .await
            .expect("append should succeed");
        assert_eq!(
            store.content_type("memory/today.md").await.as_deref(),
            Some("text/markdown")
        );

        assert_eq!(store.content_type("absent").await, None);
    }

    #[tokio::test]
    async fn missing_key_reads_as_none() {
        let store = InMemoryStore::new();
        assert_eq!(store.get_text("absent").await.expect("get should succeed"), None);
    }

    #[tokio::test]
    async fn append_creates_then_separates() {
        let store = InMemoryStore::new();

        store
            .append_text("log", "first", AppendOptions::default())
            .await
            .expect("append should succeed");
        store
            .append_text("log", "second", AppendOptions::default())
            .await
            .expect("append should succeed");

        let text = store.get_text("log").await.expect("get should succeed");
        assert_eq!(text.as_deref(), Some("first\nsecond"));
    }

    #[tokio::test]
    async fn append_skips_separator_after_trailing_newline() {
        let store = InMemoryStore::new();

        store
            .put_text("log", "first\n", PutOptions::default())
            .await
            .expect("put should succeed");
        store
            .append_text("log", "second", AppendOptions::default())
            .await
            .expect("append should succeed");

        let text = store.get_text("log").await.expect("get should succeed");
        assert_eq!(text.as_deref(), Some("first\nsecond"));
    }

    #[tokio::test]
    async fn list_filters_by_prefix() {
        let store = InMemoryStore::new();

        for key in ["workspaces/w1/a", "workspaces/w1/b", "workspaces/w2/a"] {
            store
                .put_text(key, "x", PutOptions::default())
                .await
                .expect("put should succeed");
        }

        let keys = store
            .list(&crate::store::workspace_base_key("w1"))
            .await
            .expect("list should succeed");
        assert_eq!(keys, vec!["workspaces/w1/a", "workspaces/w1/b"]);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = InMemoryStore::new();

        store
            .put_text("k", "v", PutOptions::default())
            .await
            .expect("put should succeed");
        store.delete("k").await.expect("delete should succeed");
        store.delete("k").await.expect("second delete should succeed");

        assert_eq!(store.get_text("k").await.expect("get should succeed"), None);
    }
}
