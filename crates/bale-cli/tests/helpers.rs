//! Shared test utilities for bale-cli tests.
//!
//! Projects come with shell-script stand-ins for the bundling engine and the
//! minifier so the binary can be driven end to end.

#![allow(dead_code)]

use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Prints the entry file as the bundle. Entries containing `SYNTAX ERROR` fail.
pub const ENGINE_SCRIPT: &str = r#"#!/bin/sh
input=$(cat)
entry=$(printf '%s' "$input" | sed -n 's/.*"entry":"\([^"]*\)".*/\1/p')
echo "bundling $entry" >&2
if grep -q "SYNTAX ERROR" "$entry"; then
  echo "Unexpected token" >&2
  exit 1
fi
cat "$entry"
"#;

/// Replaces every bundle with the same minified code.
pub const MINIFIER_SCRIPT: &str = r#"#!/bin/sh
cat > /dev/null
printf '{"code":"minified();","map":null}'
"#;

pub const ENGINE: &str = "sh engine.sh";
pub const MINIFIER: &str = "sh minify.sh";

/// Create a temporary project from `(relative path, content)` pairs, plus
/// `engine.sh` and `minify.sh` at its root.
pub fn project(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    fs::write(dir.path().join("engine.sh"), ENGINE_SCRIPT).expect("write engine");
    fs::write(dir.path().join("minify.sh"), MINIFIER_SCRIPT).expect("write minifier");
    for (path, content) in files {
        let full = dir.path().join(path);
        fs::create_dir_all(full.parent().expect("parent")).expect("create dirs");
        fs::write(full, content).expect("write file");
    }
    dir
}

pub fn read(path: impl AsRef<Path>) -> String {
    fs::read_to_string(path.as_ref())
        .unwrap_or_else(|e| panic!("read {}: {}", path.as_ref().display(), e))
}
