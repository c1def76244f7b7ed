//! Bale CLI library.
//!
//! The `bale` binary is a thin wrapper over these modules so that argument
//! parsing, configuration loading and reporting can be tested without spawning
//! a process.
//!
//! # Modules
//!
//! - [`cli`] - clap definitions for `bale build` and `bale plan`
//! - [`config`] - layered `bale.config.json` / `BALE_*` / CLI configuration
//! - [`commands`] - command implementations
//! - [`error`] - CLI error hierarchy and miette conversion
//! - [`logger`] - tracing subscriber setup
//! - [`ui`] - coloured status lines and formatting helpers

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logger;
pub mod ui;

pub use error::{BuildError, CliError, ConfigError, Result, ResultExt};
