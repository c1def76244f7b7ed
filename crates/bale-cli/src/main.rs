//! Bale CLI - builds plain, minified and coverage bundles from glob patterns.
//!
//! This is the entry point for the `bale` binary. It parses arguments, sets up
//! logging and colours, dispatches the command and reports errors through miette.

use bale_cli::{cli, commands, error, logger, ui};
use clap::Parser;
use miette::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    logger::init_logger(args.verbose, args.quiet, args.no_color);
    ui::init_colors(args.no_color);

    let result = match args.command {
        cli::Command::Build(build_args) => commands::build_execute(build_args).await,
        cli::Command::Plan(plan_args) => commands::plan_execute(plan_args).await,
    };

    result.map_err(error::cli_error_to_miette)
}
