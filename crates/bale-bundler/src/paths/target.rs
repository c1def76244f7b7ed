//! Output naming: how a user-supplied outfile maps each entry to its bundle path.

use path_clean::PathClean;
use std::path::{Path, PathBuf};

/// Suffix inserted before the extension when no outfile is given.
pub const DEFAULT_SUFFIX: &str = ".bundle";

/// The naming rule chosen once per run from the outfile argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// No outfile: write next to the entry as `<name>.bundle<ext>`.
    Beside,
    /// Outfile names one file; every entry maps to it.
    Literal(PathBuf),
    /// Outfile is a directory; entry names are kept and sub-directories mirrored.
    Directory(PathBuf),
    /// Outfile has a `*` in its file name; `*` becomes the entry's base name and the
    /// text after it replaces the entry's extension.
    Pattern { dir: PathBuf, extension: String },
}

impl OutputTarget {
    /// Classify an outfile argument.
    ///
    /// # Examples
    ///
    /// ```
    /// use bale_bundler::OutputTarget;
    /// use std::path::PathBuf;
    ///
    /// assert_eq!(OutputTarget::parse(Some("dist/")), OutputTarget::Directory(PathBuf::from("dist/")));
    /// assert_eq!(OutputTarget::parse(Some("dist/app.js")), OutputTarget::Literal(PathBuf::from("dist/app.js")));
    /// assert_eq!(
    ///     OutputTarget::parse(Some("dist/*.bundle.js")),
    ///     OutputTarget::Pattern { dir: PathBuf::from("dist"), extension: ".bundle.js".into() },
    /// );
    /// ```
    pub fn parse(outfile: Option<&str>) -> Self {
        let Some(outfile) = outfile.filter(|s| !s.is_empty()) else {
            return OutputTarget::Beside;
        };

        let (dir, name) = match outfile.rfind('/') {
            Some(0) => ("/", &outfile[1..]),
            Some(slash) => (&outfile[..slash], &outfile[slash + 1..]),
            None => (".", outfile),
        };

        if let Some(star) = name.find('*') {
            return OutputTarget::Pattern {
                dir: PathBuf::from(dir),
                extension: name[star + 1..].to_string(),
            };
        }

        if name.is_empty() || name == "." || name == ".." || !name.contains('.') {
            return OutputTarget::Directory(PathBuf::from(outfile));
        }

        OutputTarget::Literal(PathBuf::from(outfile))
    }

    /// Output path for `entry`, whose pattern's base directory is `base_dir`.
    ///
    /// Relative targets are anchored at `cwd`. Both `entry` and `base_dir` are
    /// expected to be absolute and cleaned.
    pub fn output_for(&self, entry: &Path, base_dir: &Path, cwd: &Path) -> PathBuf {
        let stem = entry
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        match self {
            OutputTarget::Beside => {
                let ext = entry
                    .extension()
                    .map(|e| format!(".{}", e.to_string_lossy()))
                    .unwrap_or_default();
                entry.with_file_name(format!("{stem}{DEFAULT_SUFFIX}{ext}"))
            }
            OutputTarget::Literal(path) => cwd.join(path).clean(),
            OutputTarget::Directory(dir) => {
                let name = entry.file_name().unwrap_or_default();
                cwd.join(dir)
                    .join(relative_subdir(entry, base_dir))
                    .join(name)
                    .clean()
            }
            OutputTarget::Pattern { dir, extension } => cwd
                .join(dir)
                .join(relative_subdir(entry, base_dir))
                .join(format!("{stem}{extension}"))
                .clean(),
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, OutputTarget::Literal(_))
    }
}

/// Directory of `entry` relative to `base_dir`, empty when it is not underneath.
fn relative_subdir<'a>(entry: &'a Path, base_dir: &Path) -> &'a Path {
    entry
        .parent()
        .and_then(|parent| parent.strip_prefix(base_dir).ok())
        .unwrap_or_else(|| Path::new(""))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cwd() -> PathBuf {
        PathBuf::from("/proj")
    }

    #[test]
    fn test_parse_variants() {
        assert_eq!(OutputTarget::parse(None), OutputTarget::Beside);
        assert_eq!(OutputTarget::parse(Some("")), OutputTarget::Beside);
        assert_eq!(
            OutputTarget::parse(Some("dist")),
            OutputTarget::Directory(PathBuf::from("dist"))
        );
        assert_eq!(
            OutputTarget::parse(Some(".")),
            OutputTarget::Directory(PathBuf::from("."))
        );
        assert_eq!(
            OutputTarget::parse(Some("out.js")),
            OutputTarget::Literal(PathBuf::from("out.js"))
        );
        assert_eq!(
            OutputTarget::parse(Some("*.js")),
            OutputTarget::Pattern {
                dir: PathBuf::from("."),
                extension: ".js".to_string()
            }
        );
        assert_eq!(
            OutputTarget::parse(Some("/abs/*")),
            OutputTarget::Pattern {
                dir: PathBuf::from("/abs"),
                extension: String::new()
            }
        );
    }

    #[test]
    fn test_beside_appends_suffix() {
        let out = OutputTarget::Beside.output_for(
            Path::new("/proj/src/a.js"),
            Path::new("/proj/src"),
            &cwd(),
        );
        assert_eq!(out, PathBuf::from("/proj/src/a.bundle.js"));
    }

    #[test]
    fn test_literal_ignores_entry() {
        let target = OutputTarget::parse(Some("dist/app.js"));
        for entry in ["/proj/src/a.js", "/proj/src/lib/b.js"] {
            assert_eq!(
                target.output_for(Path::new(entry), Path::new("/proj/src"), &cwd()),
                PathBuf::from("/proj/dist/app.js")
            );
        }
    }

    #[test]
    fn test_directory_mirrors_subdirs() {
        let target = OutputTarget::parse(Some("dist/"));
        assert_eq!(
            target.output_for(
                Path::new("/proj/src/lib/b.ts"),
                Path::new("/proj/src"),
                &cwd()
            ),
            PathBuf::from("/proj/dist/lib/b.ts")
        );
    }

    #[test]
    fn test_pattern_replaces_extension() {
        let target = OutputTarget::parse(Some("dist/*.bundle.js"));
        assert_eq!(
            target.output_for(
                Path::new("/proj/src/lib/b.ts"),
                Path::new("/proj/src"),
                &cwd()
            ),
            PathBuf::from("/proj/dist/lib/b.bundle.js")
        );
        assert_eq!(
            target.output_for(Path::new("/proj/src/a.js"), Path::new("/proj/src"), &cwd()),
            PathBuf::from("/proj/dist/a.bundle.js")
        );
    }

    #[test]
    fn test_entry_outside_base_dir_lands_at_root() {
        let target = OutputTarget::parse(Some("dist"));
        assert_eq!(
            target.output_for(Path::new("/other/a.js"), Path::new("/proj/src"), &cwd()),
            PathBuf::from("/proj/dist/a.js")
        );
    }
}
