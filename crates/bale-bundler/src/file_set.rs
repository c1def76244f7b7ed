//! The input/output pairing consumed by one job.

use serde::Serialize;
use std::path::{Path, PathBuf};

/// One entry file and the artifact paths derived for it.
///
/// Produced by [`crate::paths::resolve`] and never mutated afterwards; variant
/// file sets are derived copies (see [`FileSet::with_marker`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSet {
    /// Existing source file at the root of the dependency graph.
    pub entry_file: PathBuf,
    /// Bundle written by the job.
    pub output_file: PathBuf,
    /// Source-map companion, present only when maps were requested.
    pub map_file: Option<PathBuf>,
}

impl FileSet {
    pub fn new(entry_file: impl Into<PathBuf>, output_file: impl Into<PathBuf>) -> Self {
        Self {
            entry_file: entry_file.into(),
            output_file: output_file.into(),
            map_file: None,
        }
    }

    /// Attach (or drop) the `<output>.map` companion.
    pub fn with_source_map(mut self, enabled: bool) -> Self {
        self.map_file = enabled.then(|| map_path_for(&self.output_file));
        self
    }

    /// Remove the map companion regardless of how the set was created.
    pub fn without_source_map(mut self) -> Self {
        self.map_file = None;
        self
    }

    /// Derive a variant's file set by inserting `marker` before the output's final
    /// extension. The map companion follows the new output name.
    pub fn with_marker(&self, marker: &str) -> Self {
        let output_file = insert_marker(&self.output_file, marker);
        let has_map = self.map_file.is_some();
        Self {
            entry_file: self.entry_file.clone(),
            output_file,
            map_file: None,
        }
        .with_source_map(has_map)
    }

    /// File name of the bundle, used in `sourceMappingURL` comments and map `file` fields.
    pub fn output_name(&self) -> String {
        file_name_lossy(&self.output_file)
    }
}

impl std::fmt::Display for FileSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} -> {}",
            self.entry_file.display(),
            self.output_file.display()
        )?;
        if let Some(map) = &self.map_file {
            write!(f, " (+ {})", map.display())?;
        }
        Ok(())
    }
}

/// The source-map path for a bundle is always the bundle path plus `.map`.
pub fn map_path_for(output: &Path) -> PathBuf {
    let mut raw = output.as_os_str().to_os_string();
    raw.push(".map");
    PathBuf::from(raw)
}

/// `dist/a.js` + `.min` -> `dist/a.min.js`; `dist/a` + `.min` -> `dist/a.min`.
pub fn insert_marker(path: &Path, marker: &str) -> PathBuf {
    let name = file_name_lossy(path);
    let renamed = match name.rfind('.') {
        Some(dot) if dot > 0 => format!("{}{}{}", &name[..dot], marker, &name[dot..]),
        _ => format!("{name}{marker}"),
    };
    path.with_file_name(renamed)
}

pub(crate) fn file_name_lossy(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
