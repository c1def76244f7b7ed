//! Read-through file-content cache.
//!
//! Entries are keyed by path and immutable once populated, including misses. Nothing
//! is ever invalidated during a process run, so a manifest edited during a long watch
//! session is not picked up until restart.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct FileCache {
    entries: RwLock<FxHashMap<PathBuf, Option<Arc<str>>>>,
}

impl FileCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Contents of `path` as UTF-8, or `None` if it cannot be read.
    ///
    /// The first read of a path decides its cached value for the rest of the run.
    pub async fn read(&self, path: &Path) -> Option<Arc<str>> {
        let cached = self.entries.read().get(path).cloned();
        if let Some(cached) = cached {
            return cached;
        }

        let loaded = match tokio::fs::read_to_string(path).await {
            Ok(content) => Some(Arc::<str>::from(content)),
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::debug!("Failed to read {}: {}", path.display(), e);
                }
                None
            }
        };

        self.entries
            .write()
            .entry(path.to_path_buf())
            .or_insert(loaded)
            .clone()
    }

    /// Number of cached paths, hits and misses alike.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
