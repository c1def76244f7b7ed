//! `bale build` implementation.
//!
//! Loads configuration, builds every planned bundle through the configured
//! engine and reports events as they arrive. With `--watch` the jobs stay alive
//! after the initial build and are rebuilt until Ctrl+C.

use super::{report, utils};
use crate::cli::BuildArgs;
use crate::config::{BaleConfig, ConfigOverrides};
use crate::error::{BuildError, Result, ResultExt};
use crate::ui;
use bale_bundler::{CommandEngine, CommandMinifier, EventSink, FileCache, Scheduler, WatchLoop};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio::signal;
use tracing::debug;

/// Execute the build command.
///
/// # Errors
///
/// Configuration and planning errors fail immediately. Without `--watch`, any
/// failed bundle makes the command fail with [`BuildError::JobsFailed`] after
/// every other bundle has finished. In watch mode bundle failures are only
/// reported.
pub async fn execute(args: BuildArgs) -> Result<()> {
    let (config, cwd) = utils::load_config(&args.planning, ConfigOverrides::from(&args))?;
    config.validate_for_build()?;
    debug!("Working directory: {}", cwd.display());

    let options = config.to_build_options(&cwd);
    let (events, rx) = EventSink::channel();
    let scheduler = scheduler(&config, &cwd, events)?;
    let reporter = tokio::spawn(report::report(rx, cwd.clone()));

    let started = Instant::now();
    let outcome = match bale_bundler::build(&options, &scheduler, &FileCache::new()).await {
        Ok(outcome) => outcome,
        Err(err) => {
            drop(scheduler);
            let _ = reporter.await;
            return Err(err.into());
        }
    };
    let summary = outcome.summary;

    if config.watch {
        if !summary.is_success() {
            ui::warning(&format!(
                "{} of {} bundle(s) failed, watching for changes anyway",
                summary.failed,
                summary.total()
            ));
        }
        ui::info("Watching for changes (press Ctrl+C to stop)");

        let watch = WatchLoop::new(scheduler, outcome.jobs);
        tokio::select! {
            result = watch.run(config.ignore.clone(), config.debounce) => {
                result.with_hint("Check that the watched directories still exist")?;
            }
            _ = signal::ctrl_c() => {
                ui::info("Stopped watching");
            }
        }
        let _ = reporter.await;
        return Ok(());
    }

    // Closing the event channel lets the reporter drain and finish.
    drop(scheduler);
    let _ = reporter.await;

    if !summary.is_success() {
        return Err(BuildError::JobsFailed {
            failed: summary.failed,
            total: summary.total(),
        }
        .into());
    }

    ui::success(&format!(
        "Built {} bundle(s) in {}",
        summary.completed,
        ui::format_duration(started.elapsed())
    ));
    Ok(())
}

/// Scheduler running the configured engine, plus the minifier when minified
/// bundles are requested.
fn scheduler(config: &BaleConfig, cwd: &Path, events: EventSink) -> Result<Scheduler> {
    let engine = CommandEngine::new(&config.engine, cwd).map_err(|e| BuildError::ToolSetup {
        tool: "engine",
        message: e.to_string(),
    })?;
    debug!("Engine: {}", engine.program());

    let mut scheduler = Scheduler::new(Arc::new(engine), events);
    if config.minify {
        let minifier =
            CommandMinifier::new(&config.minifier, cwd).map_err(|e| BuildError::ToolSetup {
                tool: "minifier",
                message: e.to_string(),
            })?;
        scheduler = scheduler.with_minifier(Arc::new(minifier));
    }
    Ok(scheduler)
}
