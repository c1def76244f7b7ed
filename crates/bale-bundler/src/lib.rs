#![cfg_attr(docsrs, feature(doc_cfg))]

//! # bale-bundler
//!
//! Plans bundle artifacts from entry-file patterns and drives an external bundling
//! engine to produce them.
//!
//! A run goes through these stages:
//!
//! 1. [`paths::resolve`] expands glob patterns into [`FileSet`]s and derives every
//!    output path from the naming pattern.
//! 2. [`jobs::build_jobs`] turns one `FileSet` into a [`Job`] per requested
//!    [`Variant`] (plain, minified, coverage) with its transform chain.
//! 3. [`Scheduler`] drains the jobs of one entry file strictly in order, streaming
//!    the engine output to disk and running the second minification pass.
//! 4. [`WatchLoop`] keeps the jobs alive and rebuilds them when their sources change.
//!
//! ## Quick Start
//!
//! ```no_run
//! use bale_bundler::{BuildOptions, CommandEngine, EventSink, FileCache, Scheduler};
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let options = BuildOptions::new(["src/*.js"], ".")
//!     .outfile("dist/*.bundle.js")
//!     .minify(true)
//!     .debug(true);
//!
//! let engine = CommandEngine::new(&["node".into(), "scripts/bundle.mjs".into()], ".")?;
//! let (events, mut rx) = EventSink::channel();
//! let scheduler = Scheduler::new(Arc::new(engine), events);
//!
//! tokio::spawn(async move {
//!     while let Some(event) = rx.recv().await {
//!         println!("{event:?}");
//!     }
//! });
//!
//! let outcome = bale_bundler::build(&options, &scheduler, &FileCache::new()).await?;
//! assert!(outcome.summary.is_success());
//! # Ok(()) }
//! ```

use std::path::PathBuf;
use std::sync::Arc;

pub mod build;
pub mod cache;
pub mod engine;
pub mod events;
pub mod file_set;
pub mod jobs;
pub mod manifest;
pub mod minify;
pub mod paths;
pub mod sourcemap;
pub mod variant;
pub mod watch;

mod process;

pub use build::{BuildOptions, BuildOutcome, EntryPlan, build, plan};
pub use cache::FileCache;
pub use engine::{
    BundleEngine, BundleRequest, CommandEngine, EngineError, EngineHandle, EngineLogger,
    EngineOutput, Transform, TransformSpec,
};
pub use events::{BuildEvent, EventSink};
pub use file_set::FileSet;
pub use jobs::{Job, JobOptions, PostProcessor, RunSummary, Scheduler, build_jobs};
pub use minify::{
    CommandMinifier, CommentPolicy, Minifier, MinifyInput, MinifyOptions, MinifyOutput,
};
pub use paths::{OutputTarget, ResolveOptions, resolve};
pub use variant::{Variant, Variants};
pub use watch::{FileChange, FileWatcher, WatchLoop};

/// Error types for bale-bundler operations.
///
/// Planning errors (`NoEntryFiles`, `NoMatchingFiles`, `InvalidPattern`) happen before
/// any job exists and carry no [`FileSet`]. Every other failure belongs to one bundle
/// and carries the `FileSet` it was building.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// No patterns were given at all.
    #[error("No entry files given")]
    NoEntryFiles,

    /// Patterns were given but nothing matched after exclusion.
    #[error("No files matched: {}", .patterns.join(", "))]
    NoMatchingFiles { patterns: Vec<String> },

    /// A pattern could not be compiled.
    #[error("Invalid glob pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// Project-declared transforms are malformed.
    #[error("Invalid transform configuration for {}: {message}", .file_set.entry_file.display())]
    TransformConfig { file_set: FileSet, message: String },

    /// The engine failed, or its output could not be written.
    #[error("Failed to bundle {}: {message}", .file_set.entry_file.display())]
    BundleBuild { file_set: FileSet, message: String },

    /// The second minification pass failed.
    #[error("Post-processing failed for {}: {message}", .bundle.display())]
    PostProcess {
        file_set: FileSet,
        bundle: PathBuf,
        message: String,
    },

    /// File watcher could not be set up.
    #[error("File watcher error: {0}")]
    Watch(String),

    /// Background task panicked or was cancelled.
    #[error("Task join error: {0}")]
    Task(String),

    /// I/O error with context message.
    #[error("{message}")]
    Io {
        message: String,
        #[source]
        source: Arc<std::io::Error>,
    },
}

/// Result type alias for bale-bundler operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// The bundle this error belongs to, if it happened after planning.
    pub fn file_set(&self) -> Option<&FileSet> {
        match self {
            Error::TransformConfig { file_set, .. }
            | Error::BundleBuild { file_set, .. }
            | Error::PostProcess { file_set, .. } => Some(file_set),
            _ => None,
        }
    }

    /// Returns true for errors raised before any job existed.
    pub fn is_planning(&self) -> bool {
        matches!(
            self,
            Error::NoEntryFiles | Error::NoMatchingFiles { .. } | Error::InvalidPattern { .. }
        )
    }

    pub(crate) fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Error::Io {
            message: message.into(),
            source: Arc::new(source),
        }
    }
}

impl From<notify::Error> for Error {
    fn from(err: notify::Error) -> Self {
        Error::Watch(err.to_string())
    }
}

impl miette::Diagnostic for Error {
    fn code(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        Some(Box::new(match self {
            Error::NoEntryFiles => "NO_ENTRY_FILES",
            Error::NoMatchingFiles { .. } => "NO_MATCHING_FILES",
            Error::InvalidPattern { .. } => "INVALID_PATTERN",
            Error::TransformConfig { .. } => "TRANSFORM_CONFIG",
            Error::BundleBuild { .. } => "BUNDLE_BUILD",
            Error::PostProcess { .. } => "POST_PROCESS",
            Error::Watch(_) => "WATCH_ERROR",
            Error::Task(_) => "TASK_ERROR",
            Error::Io { .. } => "IO_ERROR",
        }))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(miette::Severity::Error)
    }

    fn help(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        match self {
            Error::NoEntryFiles => Some(Box::new(
                "Pass at least one entry file or glob pattern, e.g. `bale build 'src/*.js'`.",
            )),
            Error::NoMatchingFiles { .. } => Some(Box::new(
                "Check the patterns are relative to the working directory and that --exclude does not filter every match.",
            )),
            Error::TransformConfig { .. } => Some(Box::new(
                "Each entry of `bale.transform` in package.json must be a name or a [name, {options}] pair.",
            )),
            Error::PostProcess { bundle, .. } => Some(Box::new(format!(
                "The first-pass bundle was left at {}. Check the minifier command.",
                bundle.display()
            ))),
            _ => None,
        }
    }
}
