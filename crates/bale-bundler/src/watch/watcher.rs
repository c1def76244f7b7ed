//! File system watcher with debouncing for watch mode.
//!
//! Watches the directories a build depends on and forwards changes to relevant files,
//! ignoring hidden paths and configured patterns.

use crate::{Error, Result};
use glob::Pattern;
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// File change event type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileChange {
    /// File was modified
    Modified(PathBuf),
    /// File was created
    Created(PathBuf),
    /// File was removed
    Removed(PathBuf),
}

impl FileChange {
    /// Get the path affected by this change.
    pub fn path(&self) -> &Path {
        match self {
            FileChange::Modified(p) | FileChange::Created(p) | FileChange::Removed(p) => p,
        }
    }
}

/// File watcher with debouncing and filtering.
///
/// Watches one or more directories recursively and sends change events through a
/// channel. Repeated events for the same path inside the debounce window are dropped.
pub struct FileWatcher {
    watcher: RecommendedWatcher,
    roots: Arc<RwLock<Vec<PathBuf>>>,
}

impl FileWatcher {
    /// Create a new file watcher.
    ///
    /// # Arguments
    ///
    /// * `roots` - Directories to watch recursively; nested roots are folded into
    ///   their ancestor
    /// * `ignore_patterns` - Glob patterns matched against the root-relative path and
    ///   each of its components (e.g. `node_modules`, `*.log`, `dist/**`)
    /// * `debounce_ms` - Debounce delay in milliseconds
    ///
    /// # Errors
    ///
    /// Returns error if an ignore pattern is invalid, the watcher cannot be created,
    /// or a root does not exist
    pub fn new(
        roots: Vec<PathBuf>,
        ignore_patterns: Vec<String>,
        debounce_ms: u64,
    ) -> Result<(Self, mpsc::Receiver<FileChange>)> {
        let ignore = ignore_patterns
            .iter()
            .map(|p| {
                Pattern::new(p).map_err(|e| Error::InvalidPattern {
                    pattern: p.clone(),
                    message: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let (tx, rx) = mpsc::channel(100);

        let debounce = Duration::from_millis(debounce_ms);
        let mut last_seen: FxHashMap<PathBuf, Instant> = FxHashMap::default();
        let shared_roots = Arc::new(RwLock::new(Vec::new()));
        let callback_roots = Arc::clone(&shared_roots);

        let watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let Ok(event) = res else {
                return;
            };

            for path in &event.paths {
                if Self::should_ignore(path, &callback_roots.read(), &ignore) {
                    continue;
                }

                let now = Instant::now();
                if last_seen
                    .get(path)
                    .is_some_and(|last| now.duration_since(*last) < debounce)
                {
                    continue;
                }
                last_seen.insert(path.clone(), now);

                let change = match event.kind {
                    notify::EventKind::Create(_) => FileChange::Created(path.clone()),
                    notify::EventKind::Modify(_) => FileChange::Modified(path.clone()),
                    notify::EventKind::Remove(_) => FileChange::Removed(path.clone()),
                    _ => continue,
                };

                // Receiver gone means the watch loop has stopped.
                let _ = tx.blocking_send(change);
            }
        })?;

        let mut file_watcher = Self {
            watcher,
            roots: shared_roots,
        };
        for root in roots {
            file_watcher.add_root(root)?;
        }

        Ok((file_watcher, rx))
    }

    /// Start watching `root` unless an existing root already covers it.
    ///
    /// Returns whether a new directory is now being watched.
    pub fn add_root(&mut self, root: PathBuf) -> Result<bool> {
        if !root.exists() {
            return Err(Error::Watch(format!(
                "Cannot watch {}: directory does not exist",
                root.display()
            )));
        }
        if self.roots.read().iter().any(|r| root.starts_with(r)) {
            return Ok(false);
        }

        self.watcher.watch(&root, RecursiveMode::Recursive)?;

        // The event callback takes the read lock, so never hold the lock while
        // talking to the watcher.
        let nested: Vec<PathBuf> = self
            .roots
            .read()
            .iter()
            .filter(|r| r.starts_with(&root))
            .cloned()
            .collect();
        for dir in &nested {
            let _ = self.watcher.unwatch(dir);
        }

        let mut roots = self.roots.write();
        roots.retain(|r| !nested.contains(r));
        tracing::debug!(root = %root.display(), "Watching");
        roots.push(root);
        Ok(true)
    }

    /// Directories being watched.
    pub fn roots(&self) -> Vec<PathBuf> {
        self.roots.read().clone()
    }

    /// Check if a path should be ignored.
    ///
    /// Only paths inside a watched root are considered; hidden files and directories
    /// below the root are always skipped.
    fn should_ignore(path: &Path, roots: &[PathBuf], ignore: &[Pattern]) -> bool {
        let Some(rel_path) = roots.iter().find_map(|root| path.strip_prefix(root).ok()) else {
            return true;
        };

        let rel_str = rel_path.to_string_lossy();
        for pattern in ignore {
            if pattern.matches(&rel_str) {
                return true;
            }
            if rel_path
                .components()
                .any(|c| pattern.matches(&c.as_os_str().to_string_lossy()))
            {
                return true;
            }
        }

        rel_path.components().any(|component| {
            component
                .as_os_str()
                .to_str()
                .is_some_and(|name| name.starts_with('.') && name != "." && name != "..")
        })
    }
}

impl std::fmt::Debug for FileWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileWatcher")
            .field("roots", &*self.roots.read())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterns(raw: &[&str]) -> Vec<Pattern> {
        raw.iter().map(|p| Pattern::new(p).unwrap()).collect()
    }

    #[test]
    fn test_should_ignore_node_modules() {
        let roots = vec![PathBuf::from("/project")];
        let ignore = patterns(&["node_modules"]);

        let path = PathBuf::from("/project/node_modules/package/index.js");
        assert!(FileWatcher::should_ignore(&path, &roots, &ignore));

        let path = PathBuf::from("/project/src/index.js");
        assert!(!FileWatcher::should_ignore(&path, &roots, &ignore));
    }

    #[test]
    fn test_should_ignore_extension_and_subtree() {
        let roots = vec![PathBuf::from("/project")];
        let ignore = patterns(&["*.log", "dist/**"]);

        assert!(FileWatcher::should_ignore(
            Path::new("/project/logs/debug.log"),
            &roots,
            &ignore
        ));
        assert!(FileWatcher::should_ignore(
            Path::new("/project/dist/a.js"),
            &roots,
            &ignore
        ));
        assert!(!FileWatcher::should_ignore(
            Path::new("/project/src/index.js"),
            &roots,
            &ignore
        ));
    }

    #[test]
    fn test_should_ignore_hidden_files() {
        let roots = vec![PathBuf::from("/project")];

        for hidden in ["/project/.git/config", "/project/.env", "/project/src/.hidden/file.js"] {
            assert!(FileWatcher::should_ignore(Path::new(hidden), &roots, &[]));
        }
    }

    #[test]
    fn test_should_ignore_outside_roots() {
        let roots = vec![PathBuf::from("/project/src"), PathBuf::from("/vendor/lib")];

        assert!(FileWatcher::should_ignore(Path::new("/other/file.js"), &roots, &[]));
        assert!(!FileWatcher::should_ignore(Path::new("/vendor/lib/x.js"), &roots, &[]));
    }

    #[test]
    fn test_file_change_path() {
        let path = PathBuf::from("/project/src/index.js");

        let change = FileChange::Modified(path.clone());
        assert_eq!(change.path(), path.as_path());

        let change = FileChange::Removed(path.clone());
        assert_eq!(change.path(), path.as_path());
    }

    #[tokio::test]
    async fn test_nested_roots_fold_into_ancestor() {
        let temp = tempfile::TempDir::new().unwrap();
        let src = temp.path().join("src");
        std::fs::create_dir_all(src.join("lib")).unwrap();

        let (mut watcher, _rx) =
            FileWatcher::new(vec![src.join("lib")], vec![], 50).unwrap();
        assert!(watcher.add_root(src.clone()).unwrap());
        assert!(!watcher.add_root(src.join("lib")).unwrap());
        assert_eq!(watcher.roots(), vec![src]);
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let err = FileWatcher::new(vec![PathBuf::from("/definitely/not/here")], vec![], 50)
            .unwrap_err();
        assert!(matches!(err, Error::Watch(_)));
    }
}
