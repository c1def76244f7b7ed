//! Error handling for the bale CLI.
//!
//! `CliError` is what every command returns. Configuration and build failures
//! have their own enums carrying a hint for the user, and library failures are
//! kept as [`bale_bundler::Error`] so their miette diagnostics survive up to
//! `main`.
//!
//! # Example
//!
//! ```rust,no_run
//! use bale_cli::error::{Result, ResultExt};
//! use std::path::Path;
//!
//! fn read_config(path: &Path) -> Result<String> {
//!     std::fs::read_to_string(path).with_path(path)
//! }
//! ```

mod miette;

pub use self::miette::cli_error_to_miette;

use std::path::PathBuf;
use thiserror::Error;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A build ran but did not succeed
    #[error("Build error: {0}")]
    Build(#[from] BuildError),

    /// Planning, bundling or watching failed inside the bundler
    #[error(transparent)]
    Bundler(#[from] bale_bundler::Error),

    /// Invalid command-line arguments or options
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// File or directory not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// I/O errors from file system operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with custom messages
    #[error("{0}")]
    Custom(String),
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly requested config file does not exist
    #[error("Config file not found: {}\n\nHint: Create a bale.config.json file or fix the --config path", .0.display())]
    NotFound(PathBuf),

    /// Options that cannot be combined
    #[error("Conflicting options: {0}\n\nHint: These options cannot be used together")]
    ConflictingOptions(String),

    /// A required setting is missing
    #[error("Missing required field: {field}\n\nHint: {hint}")]
    MissingField {
        /// Name of the missing field
        field: String,
        /// How to provide it
        hint: String,
    },

    /// A setting has an invalid value
    #[error("Invalid value for '{field}': {value}\n\nHint: {hint}")]
    InvalidValue {
        /// Name of the field
        field: String,
        /// The rejected value
        value: String,
        /// What a valid value looks like
        hint: String,
    },

    /// I/O error while reading config
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
}

/// Build errors raised by the CLI layer.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The engine or minifier command could not be set up
    #[error("Cannot use {tool} command: {message}\n\nHint: Pass the command as a single string, e.g. --{tool} 'node scripts/bundle.mjs'")]
    ToolSetup {
        /// `engine` or `minifier`
        tool: &'static str,
        /// Why the command was rejected
        message: String,
    },

    /// Some bundles failed; each failure was already reported as it happened
    #[error("{failed} of {total} bundle(s) failed")]
    JobsFailed {
        /// Number of failed jobs
        failed: usize,
        /// Number of jobs in the run
        total: usize,
    },

    /// Some entry files could not be planned
    #[error("{0} entry file(s) could not be planned")]
    PlanFailed(usize),
}

/// Result type alias using `CliError` as the default error type.
pub type Result<T, E = CliError> = std::result::Result<T, E>;

/// Extension trait for adding context to `Result` types.
pub trait ResultExt<T> {
    /// Turn a not-found I/O error into [`CliError::FileNotFound`] for `path`.
    ///
    /// ```rust,no_run
    /// # use std::path::Path;
    /// # use bale_cli::error::{Result, ResultExt};
    /// # fn run() -> Result<()> {
    /// let path = Path::new("bale.config.json");
    /// std::fs::read_to_string(path).with_path(path)?;
    /// # Ok(())
    /// # }
    /// ```
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T>;

    /// Append a hint to the error message.
    fn with_hint(self, hint: impl std::fmt::Display) -> Result<T>;

    /// Prefix the error message.
    fn context(self, msg: impl std::fmt::Display) -> Result<T>;
}

impl<T, E: Into<CliError>> ResultExt<T> for std::result::Result<T, E> {
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T> {
        self.map_err(|e| match e.into() {
            CliError::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound => {
                CliError::FileNotFound(path.as_ref().to_path_buf())
            }
            other => other,
        })
    }

    fn with_hint(self, hint: impl std::fmt::Display) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            CliError::Custom(format!("{}\n\nHint: {}", err, hint))
        })
    }

    fn context(self, msg: impl std::fmt::Display) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            CliError::Custom(format!("{}: {}", msg, err))
        })
    }
}
