use crate::file_set::file_name_lossy;
use crate::minify::{CommentPolicy, Minifier, MinifyInput, MinifyOptions};
use crate::sourcemap;
use crate::{Error, FileSet, Result};
use serde_json::Value;
use std::path::Path;
use tracing::{debug, warn};

/// Whole-bundle minification run after the minified variant's first build.
///
/// Reads the written bundle and its map back, minifies with mangling off and the
/// comment policy applied again, then overwrites both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostProcessor {
    comments: CommentPolicy,
}

impl PostProcessor {
    pub fn new(comments: CommentPolicy) -> Self {
        Self { comments }
    }

    pub fn options(&self) -> MinifyOptions {
        MinifyOptions::whole_bundle(self.comments)
    }

    pub async fn run(&self, file_set: &FileSet, minifier: &dyn Minifier) -> Result<()> {
        let fail = |message: String| Error::PostProcess {
            file_set: file_set.clone(),
            bundle: file_set.output_file.clone(),
            message,
        };

        let code = tokio::fs::read_to_string(&file_set.output_file)
            .await
            .map_err(|e| fail(format!("Failed to read bundle: {}", e)))?;
        let map = match &file_set.map_file {
            Some(path) => read_map(path).await.map_err(fail)?,
            None => None,
        };

        let input = MinifyInput {
            file_name: file_set.output_name(),
            code: sourcemap::strip_link_comment(&code).to_string(),
            map,
            options: self.options(),
        };
        let output = minifier
            .minify(input)
            .await
            .map_err(|e| fail(e.to_string()))?;

        let mut minified = output.code.into_bytes();
        if let Some(map_file) = &file_set.map_file {
            let map_json = match output.map {
                Some(mut map) => {
                    sourcemap::set_file(&mut map, &file_set.output_name());
                    let json = serde_json::to_vec(&map)
                        .map_err(|e| fail(format!("Failed to encode source map: {}", e)))?;
                    sourcemap::append_link_comment(&mut minified, &file_name_lossy(map_file));
                    json
                }
                None => {
                    warn!(
                        "Minifier returned no source map for {}; clearing {}",
                        file_set.output_file.display(),
                        map_file.display()
                    );
                    Vec::new()
                }
            };
            tokio::fs::write(map_file, map_json)
                .await
                .map_err(|e| fail(format!("Failed to write {}: {}", map_file.display(), e)))?;
        }

        tokio::fs::write(&file_set.output_file, &minified)
            .await
            .map_err(|e| fail(format!("Failed to write bundle: {}", e)))?;

        debug!(
            bundle = %file_set.output_file.display(),
            before = code.len(),
            after = minified.len(),
            "Whole-bundle minification done"
        );
        Ok(())
    }
}

/// An empty map file is the untouched placeholder and means no map.
async fn read_map(path: &Path) -> std::result::Result<Option<Value>, String> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    if content.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|e| format!("{} is not a valid source map: {}", path.display(), e))
}
