//! Project-declared transforms from the nearest `package.json`.
//!
//! ```json
//! { "bale": { "transform": ["envify", ["babelify", { "presets": ["env"] }]] } }
//! ```

use crate::cache::FileCache;
use crate::engine::TransformSpec;
use serde_json::Value;
use std::path::{Path, PathBuf};

pub const MANIFEST_FILE: &str = "package.json";

/// Transforms declared by the manifest closest to `entry`.
///
/// The nearest manifest wins even when it declares nothing. Manifests are read
/// through `cache`.
///
/// # Errors
///
/// Returns a message naming the manifest when it is not valid JSON or its
/// `bale.transform` field is malformed.
pub async fn project_transforms(
    entry: &Path,
    cache: &FileCache,
) -> Result<Vec<TransformSpec>, String> {
    let Some((manifest_path, content)) = find_manifest(entry, cache).await else {
        return Ok(Vec::new());
    };

    let manifest: Value = serde_json::from_str(&content)
        .map_err(|e| format!("{} is not valid JSON: {}", manifest_path.display(), e))?;

    let Some(field) = manifest.get("bale").and_then(|b| b.get("transform")) else {
        return Ok(Vec::new());
    };

    parse_transforms(field)
        .map_err(|message| format!("{} (in {})", message, manifest_path.display()))
}

async fn find_manifest(entry: &Path, cache: &FileCache) -> Option<(PathBuf, std::sync::Arc<str>)> {
    for dir in entry.parent()?.ancestors() {
        let candidate = dir.join(MANIFEST_FILE);
        if let Some(content) = cache.read(&candidate).await {
            return Some((candidate, content));
        }
    }
    None
}

fn parse_transforms(field: &Value) -> Result<Vec<TransformSpec>, String> {
    let Value::Array(entries) = field else {
        return Err("`bale.transform` must be an array".to_string());
    };

    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            parse_entry(entry).ok_or_else(|| {
                format!(
                    "`bale.transform[{}]` must be a name or a [name, {{options}}] pair, got {}",
                    index, entry
                )
            })
        })
        .collect()
}

fn parse_entry(entry: &Value) -> Option<TransformSpec> {
    match entry {
        Value::String(name) if !name.is_empty() => Some(TransformSpec::new(name)),
        Value::Array(pair) => match pair.as_slice() {
            [Value::String(name)] if !name.is_empty() => Some(TransformSpec::new(name)),
            [Value::String(name), options @ Value::Object(_)] if !name.is_empty() => {
                Some(TransformSpec::new(name).with_options(options.clone()))
            }
            _ => None,
        },
        _ => None,
    }
}
