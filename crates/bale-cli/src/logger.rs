//! Logging setup for the bale CLI.
//!
//! Logs go to stderr through a compact `tracing-subscriber` formatter so that
//! stdout stays reserved for command output such as `bale plan --json`.
//!
//! # Example
//!
//! ```rust,no_run
//! use bale_cli::logger::init_logger;
//! use tracing::info;
//!
//! init_logger(false, false, false);
//! info!("Starting build");
//! ```

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const VERBOSE_FILTER: &str = "bale=debug,bale_bundler=debug,bale_cli=debug";
const QUIET_FILTER: &str = "bale=error,bale_bundler=error,bale_cli=error";
const DEFAULT_FILTER: &str = "bale=info,bale_bundler=info,bale_cli=info";

/// Initialize the global tracing subscriber.
///
/// The filter is chosen in this order:
/// 1. `verbose`: debug level for the bale crates
/// 2. `quiet`: errors only
/// 3. `RUST_LOG`, if set and valid
/// 4. info level for the bale crates
///
/// Must be called once, before anything logs.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    init_logger_with_filter(filter_for(verbose, quiet), no_color);
}

/// Initialize the logger with an explicit filter.
///
/// ```rust,no_run
/// use bale_cli::logger::init_logger_with_filter;
/// use tracing_subscriber::EnvFilter;
///
/// init_logger_with_filter(EnvFilter::new("bale_bundler=trace"), true);
/// ```
pub fn init_logger_with_filter(filter: EnvFilter, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color && crate::ui::should_use_color())
        .compact();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

fn filter_for(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}
