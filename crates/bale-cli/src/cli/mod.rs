//! Command-line interface definition for bale.
//!
//! # Command Structure
//!
//! - `bale build` - build every planned bundle, optionally watching for changes
//! - `bale plan` - print the planned bundles without running the engine

mod commands;
mod validation;

use clap::Parser;

pub use commands::{BuildArgs, Command, PlanArgs, PlanningArgs};
pub use validation::{is_identifier_path, parse_comments, parse_standalone};

/// Bale - build plain, minified and coverage bundles from glob patterns
#[derive(Parser, Debug)]
#[command(
    name = "bale",
    version,
    about = "Build plain, minified and coverage bundles from glob patterns",
    long_about = "Bale expands entry-file patterns, derives an output path for every\n\
                  requested variant (plain, minified, coverage) and drives an external\n\
                  bundling engine to produce each bundle, optionally rebuilding on change."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}
