//! Layered configuration for bale.
//!
//! Settings are merged from, lowest to highest priority: built-in defaults,
//! `bale.config.json` (or the file given with `--config`), `BALE_*` environment
//! variables, and command-line arguments.

mod loading;
mod validation;

use bale_bundler::{BuildOptions, CommentPolicy};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};

pub use loading::{CONFIG_FILE, ENV_PREFIX};

/// Bale configuration, as found in `bale.config.json`.
///
/// Every key is a single word so the same name works in the file and as a
/// `BALE_*` environment variable.
///
/// ```json
/// {
///   "patterns": ["src/*.js"],
///   "exclude": "src/*.test.js",
///   "outfile": "dist/",
///   "minify": true,
///   "debug": true,
///   "engine": "node scripts/bundle.mjs",
///   "minifier": ["node", "scripts/minify.mjs"]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BaleConfig {
    /// Entry files or glob patterns
    #[serde(default, deserialize_with = "one_or_many")]
    pub patterns: Vec<String>,

    /// Glob of entries to leave out
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<String>,

    /// Output naming pattern (directory, `*` wildcard or literal)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outfile: Option<String>,

    /// Build the plain bundle
    #[serde(default = "default_plain")]
    pub plain: bool,

    /// Build the minified bundle
    #[serde(default)]
    pub minify: bool,

    /// Build the coverage-instrumented bundle
    #[serde(default)]
    pub coverage: bool,

    /// Write `.map` companions
    #[serde(default)]
    pub debug: bool,

    /// UMD global name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standalone: Option<String>,

    /// Keep rebuilding on change
    #[serde(default)]
    pub watch: bool,

    /// Which comments survive minification
    #[serde(default)]
    pub comments: CommentPolicy,

    /// Bundling engine command; a string is split on whitespace
    #[serde(default, deserialize_with = "command_line")]
    pub engine: Vec<String>,

    /// Whole-bundle minifier command; a string is split on whitespace
    #[serde(default, deserialize_with = "command_line")]
    pub minifier: Vec<String>,

    /// Glob patterns the watcher ignores
    #[serde(default = "default_ignore", deserialize_with = "one_or_many")]
    pub ignore: Vec<String>,

    /// Milliseconds before a repeated change to the same file counts again
    #[serde(default = "default_debounce")]
    pub debounce: u64,

    /// Working directory, relative to where the config was loaded from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<PathBuf>,
}

impl Default for BaleConfig {
    fn default() -> Self {
        Self {
            patterns: Vec::new(),
            exclude: None,
            outfile: None,
            plain: default_plain(),
            minify: false,
            coverage: false,
            debug: false,
            standalone: None,
            watch: false,
            comments: CommentPolicy::default(),
            engine: Vec::new(),
            minifier: Vec::new(),
            ignore: default_ignore(),
            debounce: default_debounce(),
            cwd: None,
        }
    }
}

impl BaleConfig {
    /// The directory patterns and outputs resolve against.
    pub fn working_dir(&self, base_dir: &Path) -> PathBuf {
        match &self.cwd {
            Some(cwd) => base_dir.join(cwd),
            None => base_dir.to_path_buf(),
        }
    }

    /// Library options for this configuration, resolved against `cwd`.
    pub fn to_build_options(&self, cwd: &Path) -> BuildOptions {
        let mut options = BuildOptions::new(self.patterns.iter().cloned(), cwd)
            .plain(self.plain)
            .minify(self.minify)
            .coverage(self.coverage)
            .debug(self.debug)
            .comments(self.comments)
            .watch(self.watch);

        if let Some(exclude) = &self.exclude {
            options = options.exclude(exclude.clone());
        }
        if let Some(outfile) = &self.outfile {
            options = options.outfile(outfile.clone());
        }
        if let Some(standalone) = &self.standalone {
            options = options.standalone(standalone.clone());
        }
        options
    }
}

/// Command-line values that override every other source.
///
/// Unset fields are skipped so they never mask the config file or environment.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub patterns: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outfile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plain: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minify: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coverage: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standalone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub watch: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<CommentPolicy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minifier: Option<String>,
}

impl From<&crate::cli::PlanningArgs> for ConfigOverrides {
    /// Boolean flags only override when they are set.
    fn from(args: &crate::cli::PlanningArgs) -> Self {
        Self {
            patterns: args.patterns.clone(),
            exclude: args.exclude.clone(),
            outfile: args.outfile.clone(),
            plain: args.no_plain.then_some(false),
            minify: args.minify.then_some(true),
            coverage: args.coverage.then_some(true),
            debug: args.debug.then_some(true),
            standalone: args.standalone.clone(),
            comments: args.comments,
            ..Default::default()
        }
    }
}

impl From<&crate::cli::BuildArgs> for ConfigOverrides {
    fn from(args: &crate::cli::BuildArgs) -> Self {
        Self {
            watch: args.watch.then_some(true),
            engine: args.engine.clone(),
            minifier: args.minifier.clone(),
            ..Self::from(&args.planning)
        }
    }
}

fn default_plain() -> bool {
    true
}

fn default_ignore() -> Vec<String> {
    vec!["node_modules".to_string()]
}

fn default_debounce() -> u64 {
    100
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn one_or_many<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(value) => vec![value],
        OneOrMany::Many(values) => values,
    })
}

fn command_line<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(line) => line.split_whitespace().map(str::to_string).collect(),
        OneOrMany::Many(argv) => argv,
    })
}
