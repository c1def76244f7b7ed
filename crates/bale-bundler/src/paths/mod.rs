//! Path resolution: glob patterns in, [`FileSet`]s out.
//!
//! Resolution is a pure function of the patterns, the exclusion pattern, the naming
//! pattern and the working directory. The only filesystem state it observes is the
//! glob match itself.

mod target;

pub use target::{DEFAULT_SUFFIX, OutputTarget};

use crate::{Error, FileSet, Result};
use glob::Pattern;
use path_clean::PathClean;
use rustc_hash::FxHashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Inputs to [`resolve`] besides the patterns themselves.
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    /// Directory relative patterns and outputs are anchored at.
    pub cwd: PathBuf,
    /// Matches of this pattern are dropped.
    pub exclude: Option<String>,
    /// Naming pattern, directory, or literal file for outputs.
    pub outfile: Option<String>,
    /// Attach `<output>.map` companions.
    pub debug: bool,
}

/// Expand `patterns` into one [`FileSet`] per matched entry file.
///
/// Entries matched by several patterns are kept once, at their first match.
///
/// # Errors
///
/// - [`Error::NoEntryFiles`] when `patterns` is empty
/// - [`Error::InvalidPattern`] when a pattern does not compile
/// - [`Error::NoMatchingFiles`] when nothing is left after exclusion
pub fn resolve(patterns: &[String], options: &ResolveOptions) -> Result<Vec<FileSet>> {
    if patterns.is_empty() {
        return Err(Error::NoEntryFiles);
    }

    let target = OutputTarget::parse(options.outfile.as_deref());
    let exclude = options
        .exclude
        .as_deref()
        .filter(|p| !p.is_empty())
        .map(compile)
        .transpose()?;

    let mut seen = FxHashSet::default();
    let mut file_sets = Vec::new();

    for pattern in patterns {
        let base = options.cwd.join(base_dir(pattern)).clean();
        debug!(pattern = %pattern, base_dir = %base.display(), "Expanding pattern");

        for entry in expand(pattern, &options.cwd)? {
            if exclude
                .as_ref()
                .is_some_and(|exclude| is_excluded(exclude, &entry, &options.cwd))
            {
                debug!(entry = %entry.display(), "Excluded");
                continue;
            }
            if !seen.insert(entry.clone()) {
                continue;
            }

            let output = target.output_for(&entry, &base, &options.cwd);
            file_sets.push(FileSet::new(entry, output).with_source_map(options.debug));
        }
    }

    if file_sets.is_empty() {
        return Err(Error::NoMatchingFiles {
            patterns: patterns.to_vec(),
        });
    }

    if target.is_literal() && file_sets.len() > 1 {
        warn!(
            "{} entry files share the literal output {}; each bundle overwrites the last",
            file_sets.len(),
            file_sets[0].output_file.display()
        );
    }

    Ok(file_sets)
}

/// Lowest non-wildcard ancestor directory of a pattern.
///
/// The pattern is cut at its first wildcard character and the directory portion of
/// what remains is returned.
///
/// ```
/// use bale_bundler::paths::base_dir;
/// use std::path::PathBuf;
///
/// assert_eq!(base_dir("src/**/*.js"), PathBuf::from("src"));
/// assert_eq!(base_dir("src/app.js"), PathBuf::from("src"));
/// assert_eq!(base_dir("*.js"), PathBuf::from("."));
/// ```
pub fn base_dir(pattern: &str) -> PathBuf {
    let literal = match pattern.find(['*', '?', '[', '{']) {
        Some(wildcard) => &pattern[..wildcard],
        None => pattern,
    };

    let dir = match literal.rfind('/') {
        Some(0) => "/",
        Some(slash) => &literal[..slash],
        None => ".",
    };
    PathBuf::from(dir)
}

/// Files (never directories) matched by `pattern`, cleaned and absolute.
fn expand(pattern: &str, cwd: &Path) -> Result<Vec<PathBuf>> {
    let absolute = if Path::new(pattern).is_absolute() {
        PathBuf::from(pattern)
    } else {
        cwd.join(pattern)
    };

    let entries = glob::glob(&absolute.to_string_lossy()).map_err(|e| Error::InvalidPattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })?;

    let mut files = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) if path.is_file() => files.push(path.clean()),
            Ok(_) => {}
            Err(e) => warn!("Skipping unreadable path while expanding '{}': {}", pattern, e),
        }
    }
    Ok(files)
}

fn compile(pattern: &str) -> Result<Pattern> {
    Pattern::new(pattern).map_err(|e| Error::InvalidPattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

/// Exclusion patterns may be written relative to `cwd` or as absolute paths.
fn is_excluded(exclude: &Pattern, entry: &Path, cwd: &Path) -> bool {
    exclude.matches_path(entry)
        || entry
            .strip_prefix(cwd)
            .map(|rel| exclude.matches_path(rel))
            .unwrap_or(false)
}
