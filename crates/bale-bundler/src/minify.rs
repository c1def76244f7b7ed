//! Minification options and the whole-bundle minifier contract.
//!
//! Phase one is a [`Transform::Minify`](crate::Transform::Minify) step applied per module
//! by the engine. Phase two runs a [`Minifier`] over the finished bundle.

use crate::engine::EngineError;
use crate::process::ToolCommand;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Which comments survive minification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentPolicy {
    /// Strip every comment.
    None,
    /// Keep `/*!` blocks and comments tagged `@license` or `@preserve`.
    #[default]
    License,
    /// Keep every comment.
    All,
}

impl CommentPolicy {
    /// Parse a comment policy.
    ///
    /// ```
    /// use bale_bundler::CommentPolicy;
    ///
    /// assert_eq!(CommentPolicy::parse("License").unwrap(), CommentPolicy::License);
    /// assert!(CommentPolicy::parse("some").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "none" | "false" => Ok(Self::None),
            "license" => Ok(Self::License),
            "all" | "true" => Ok(Self::All),
            _ => Err(format!(
                "Invalid comment policy: '{}'. Expected: none, license, all",
                s
            )),
        }
    }
}

impl std::fmt::Display for CommentPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::License => write!(f, "license"),
            Self::All => write!(f, "all"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinifyOptions {
    /// Rename local identifiers.
    pub mangle: bool,
    pub comments: CommentPolicy,
}

impl MinifyOptions {
    /// Options for phase one: each module is mangled on its own.
    pub fn per_module(comments: CommentPolicy) -> Self {
        Self {
            mangle: true,
            comments,
        }
    }

    /// Options for phase two: identifiers were mangled already, comments are
    /// filtered again because bundling may have reintroduced some.
    pub fn whole_bundle(comments: CommentPolicy) -> Self {
        Self {
            mangle: false,
            comments,
        }
    }
}

/// Input to a whole-bundle minification.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MinifyInput {
    /// Bundle file name, for the map's `file` field.
    pub file_name: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map: Option<serde_json::Value>,
    pub options: MinifyOptions,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MinifyOutput {
    pub code: String,
    #[serde(default)]
    pub map: Option<serde_json::Value>,
}

#[async_trait]
pub trait Minifier: Send + Sync {
    async fn minify(&self, input: MinifyInput) -> Result<MinifyOutput, EngineError>;
}

/// Minifier backed by an external command.
///
/// The [`MinifyInput`] is written to stdin as JSON; stdout must be a JSON
/// [`MinifyOutput`].
#[derive(Debug, Clone)]
pub struct CommandMinifier {
    tool: ToolCommand,
}

impl CommandMinifier {
    pub fn new(argv: &[String], cwd: impl Into<PathBuf>) -> Result<Self, EngineError> {
        Ok(Self {
            tool: ToolCommand::from_argv(argv, cwd)?,
        })
    }
}

#[async_trait]
impl Minifier for CommandMinifier {
    async fn minify(&self, input: MinifyInput) -> Result<MinifyOutput, EngineError> {
        let payload = serde_json::to_vec(&input)
            .map_err(|e| EngineError::new(format!("Failed to encode minifier input: {}", e)))?;

        let stdout = self
            .tool
            .run(&payload, &|line| {
                tracing::debug!(target: "bale_bundler::minify", "{}", line)
            })
            .await?;

        serde_json::from_slice(&stdout).map_err(|e| {
            EngineError::new(format!(
                "`{}` did not print a JSON {{code, map}} object: {}",
                self.tool.program(),
                e
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_comment_policy() {
        assert_eq!(CommentPolicy::parse("none").unwrap(), CommentPolicy::None);
        assert_eq!(CommentPolicy::parse("ALL").unwrap(), CommentPolicy::All);
        assert_eq!(CommentPolicy::parse("true").unwrap(), CommentPolicy::All);
        assert!(CommentPolicy::parse("").is_err());
    }

    #[test]
    fn test_phase_options() {
        assert!(MinifyOptions::per_module(CommentPolicy::None).mangle);
        assert!(!MinifyOptions::whole_bundle(CommentPolicy::None).mangle);
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for policy in [CommentPolicy::None, CommentPolicy::License, CommentPolicy::All] {
            assert_eq!(CommentPolicy::parse(&policy.to_string()).unwrap(), policy);
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_minifier_reads_json() {
        let minifier = CommandMinifier::new(
            &[
                "sh".to_string(),
                "-c".to_string(),
                r#"cat >/dev/null; printf '{"code":"a()"}'"#.to_string(),
            ],
            ".",
        )
        .unwrap();

        let output = minifier
            .minify(MinifyInput {
                file_name: "a.min.js".to_string(),
                code: "a ( ) ;".to_string(),
                map: None,
                options: MinifyOptions::whole_bundle(CommentPolicy::License),
            })
            .await
            .unwrap();

        assert_eq!(output.code, "a()");
        assert!(output.map.is_none());
    }
}
