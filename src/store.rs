//! Text-store contract and dynamic dispatch companion.
//!
//! The uniform async key/value text interface every storage backend
//! (filesystem, object store, remote worker) must satisfy. Keys are
//! slash-delimited logical paths (`workspaces/{id}/...`, `memory/2026-08-28.md`);
//! the backend maps them to physical storage.

pub mod fs;
pub mod memory;

pub use fs::FsStore;
pub use memory::InMemoryStore;

use crate::error::Result;
use std::pin::Pin;

/// Options for [`TextStore::put_text`].
#[derive(Debug, Clone, Default)]
pub struct PutOptions {
    /// MIME content type hint for backends that record one.
    pub content_type: Option<String>,
}

/// Options for [`TextStore::append_text`].
#[derive(Debug, Clone)]
pub struct AppendOptions {
    /// Separator inserted before the appended text when the existing
    /// content does not already end in a newline.
    pub separator: String,
}

impl Default for AppendOptions {
    fn default() -> Self {
        Self {
            separator: "\n".to_string(),
        }
    }
}

/// Static trait for text storage backends.
/// Use this for type-safe implementations.
pub trait TextStore: Send + Sync + 'static {
    /// Fetch the text at `key`, or None when absent.
    fn get_text(&self, key: &str) -> impl std::future::Future<Output = Result<Option<String>>> + Send;

    /// Write `text` at `key`, replacing any existing content.
    fn put_text(
        &self,
        key: &str,
        text: &str,
        options: PutOptions,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Append `text` at `key`, inserting the separator only when the
    /// existing content does not already end in a newline. Creates the key
    /// when absent.
    fn append_text(
        &self,
        key: &str,
        text: &str,
        options: AppendOptions,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// List keys under `prefix`.
    fn list(&self, prefix: &str) -> impl std::future::Future<Output = Result<Vec<String>>> + Send;

    /// Delete the text at `key`. Missing keys are not an error.
    fn delete(&self, key: &str) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Dynamic trait for runtime polymorphism.
/// Use this when you need `Arc<dyn TextStoreDyn>` for storing different backends.
pub trait TextStoreDyn: Send + Sync + 'static {
    fn get_text<'a>(
        &'a self,
        key: &'a str,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<Option<String>>> + Send + 'a>>;

    fn put_text<'a>(
        &'a self,
        key: &'a str,
        text: &'a str,
        options: PutOptions,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<()>> + Send + 'a>>;

    fn append_text<'a>(
        &'a self,
        key: &'a str,
        text: &'a str,
        options: AppendOptions,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<()>> + Send + 'a>>;

    fn list<'a>(
        &'a self,
        prefix: &'a str,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<Vec<String>>> + Send + 'a>>;

    fn delete<'a>(
        &'a self,
        key: &'a str,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<()>> + Send + 'a>>;
}

/// Blanket implementation: any type implementing TextStore automatically implements TextStoreDyn.
impl<T: TextStore> TextStoreDyn for T {
    fn get_text<'a>(
        &'a self,
        key: &'a str,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<Option<String>>> + Send + 'a>> {
        Box::pin(TextStore::get_text(self, key))
    }

    fn put_text<'a>(
        &'a self,
        key: &'a str,
        text: &'a str,
        options: PutOptions,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(TextStore::put_text(self, key, text, options))
    }

    fn append_text<'a>(
        &'a self,
        key: &'a str,
        text: &'a str,
        options: AppendOptions,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(TextStore::append_text(self, key, text, options))
    }

    fn list<'a>(
        &'a self,
        prefix: &'a str,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<Vec<String>>> + Send + 'a>> {
        Box::pin(TextStore::list(self, prefix))
    }

    fn delete<'a>(
        &'a self,
        key: &'a str,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(TextStore::delete(self, key))
    }
}

/// Select a backend for the configured data directory, type-erased so
/// callers can hold any backend behind one handle.
///
/// `Some(root)` opens a filesystem store under `root/store`; `None` yields
/// an in-memory store for tests and dry runs.
pub fn open_store(data_dir: Option<&std::path::Path>) -> std::sync::Arc<dyn TextStoreDyn> {
    match data_dir {
        Some(root) => std::sync::Arc::new(FsStore::new(root.join("store"))),
        None => std::sync::Arc::new(InMemoryStore::new()),
    }
}

/// Base key for a workspace's namespace. Pure prefixing, no state.
pub fn workspace_base_key(workspace_id: &str) -> String {
    format!("workspaces/{workspace_id}")
}

/// Join text with the separator semantics shared by every backend: the
/// separator is inserted only when the existing content is non-empty and
/// does not already end in a newline.
pub(crate) fn join_appended(existing: Option<&str>, text: &str, separator: &str) -> String {
    match existing {
        None => text.to_string(),
        Some(existing) if existing.is_empty() || existing.ends_with('\n') => {
            format!("{existing}{text}")
        }
        Some(existing) => format!("{existing}{separator}{text}"),
    }
}
