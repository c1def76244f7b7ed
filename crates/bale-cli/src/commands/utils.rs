//! Shared helpers for command implementations.

use crate::cli::PlanningArgs;
use crate::config::{BaleConfig, ConfigOverrides};
use crate::error::{CliError, Result, ResultExt};
use std::fs;
use std::path::{Path, PathBuf};

/// Resolve a path relative to a working directory.
///
/// Absolute paths are returned unchanged.
pub fn resolve_path(path: &Path, cwd: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

/// The directory config is looked up in: `--cwd` resolved against the process
/// working directory, or the process working directory itself.
pub fn base_dir(cwd_arg: Option<&Path>) -> Result<PathBuf> {
    let current = std::env::current_dir()?;
    let dir = match cwd_arg {
        Some(path) => resolve_path(path, &current),
        None => current,
    };
    ensure_dir(&dir)?;
    Ok(dir)
}

/// Fail unless `dir` exists and is a directory.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    let metadata = fs::metadata(dir).with_path(dir)?;
    if !metadata.is_dir() {
        return Err(CliError::InvalidArgument(format!(
            "Not a directory: {}",
            dir.display()
        )));
    }
    Ok(())
}

/// Load the merged configuration and the working directory it applies to.
pub fn load_config(
    planning: &PlanningArgs,
    overrides: ConfigOverrides,
) -> Result<(BaleConfig, PathBuf)> {
    let base = base_dir(planning.cwd.as_deref())?;
    let config = BaleConfig::load(&overrides, planning.config.as_deref(), &base)?;
    let cwd = config.working_dir(&base);
    ensure_dir(&cwd)?;
    Ok((config, cwd))
}
