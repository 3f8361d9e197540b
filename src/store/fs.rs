//! Filesystem text store.
//!
//! Maps logical keys to files under a root directory. Keys are validated
//! before touching the filesystem so a hostile key can never escape the
//! root.

use crate::error::{Result, StoreError};
use crate::store::{AppendOptions, PutOptions, TextStore, join_appended};
use std::path::{Component, Path, PathBuf};

/// Text store rooted at a directory.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve a logical key to a path under the root, rejecting empty
    /// keys, absolute paths, and any traversal component.
    fn resolve(&self, key: &str) -> Result<PathBuf> {
        if key.trim().is_empty() {
            return Err(StoreError::InvalidKey("empty key".into()).into());
        }

        let relative = Path::new(key);
        for component in relative.components() {
            match component {
                Component::Normal(_) => {}
                _ => {
                    return Err(StoreError::InvalidKey(format!(
                        "key must be a relative path without traversal: {key}"
                    ))
                    .into());
                }
            }
        }

        Ok(self.root.join(relative))
    }
}

impl TextStore for FsStore {
    async fn get_text(&self, key: &str) -> Result<Option<String>> {
        let path = self.resolve(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => Ok(Some(text)),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(StoreError::Io(error).into()),
        }
    }

    async fn put_text(&self, key: &str, text: &str, _options: PutOptions) -> Result<()> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(StoreError::Io)?;
        }
        tokio::fs::write(&path, text).await.map_err(StoreError::Io)?;
        Ok(())
    }

    async fn append_text(&self, key: &str, text: &str, options: AppendOptions) -> Result<()> {
        let existing = self.get_text(key).await?;
        let joined = join_appended(existing.as_deref(), text, &options.separator);
        self.put_text(key, &joined, PutOptions::default()).await
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        let mut pending = vec![self.root.clone()];

        // Iterative walk; async fns can't recurse without boxing.
        while let Some(dir) = pending.pop() {
            let mut entries = match tokio::fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(error) if error.kind() == std::io::ErrorKind::NotFound => continue,
                Err(error) => return Err(StoreError::Io(error).into()),
            };

            while let Some(entry) = entries.next_entry().await.map_err(StoreError::Io)? {
                let path = entry.path();
                let file_type = entry.file_type().await.map_err(StoreError::Io)?;
                if file_type.is_dir() {
                    pending.push(path);
                    continue;
                }

                let Ok(relative) = path.strip_prefix(&self.root) else {
                    continue;
                };
                let key = relative.to_string_lossy().replace('\\', "/");
                if key.starts_with(prefix) {
                    keys.push(key);
                }
            }
        }

        keys.sort();
        Ok(keys)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let path = self.resolve(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(StoreError::Io(error).into()),
        }
    }
}
