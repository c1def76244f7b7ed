//! Whole-run orchestration: resolve, plan jobs, and drain them per entry file.

use crate::cache::FileCache;
use crate::jobs::{Job, JobOptions, RunSummary, Scheduler, build_jobs};
use crate::minify::CommentPolicy;
use crate::paths::{self, ResolveOptions};
use crate::{Error, FileSet, Result, Variants};
use std::path::PathBuf;
use tokio::task::JoinSet;
use tracing::{debug, info};

/// Options for one bale run.
///
/// # Examples
///
/// ```
/// use bale_bundler::BuildOptions;
///
/// let options = BuildOptions::new(["src/*.js"], "/project")
///     .exclude("src/*.test.js")
///     .outfile("dist/")
///     .minify(true)
///     .debug(true);
///
/// assert!(options.variants.plain && options.variants.minified);
/// ```
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    pub patterns: Vec<String>,
    pub cwd: PathBuf,
    pub exclude: Option<String>,
    pub outfile: Option<String>,
    pub variants: Variants,
    /// Write `.map` companions.
    pub debug: bool,
    pub standalone: Option<String>,
    pub comments: CommentPolicy,
    pub watch: bool,
}

impl BuildOptions {
    /// Plain bundles of `patterns`, resolved against `cwd`.
    pub fn new<I, S>(patterns: I, cwd: impl Into<PathBuf>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            patterns: patterns.into_iter().map(Into::into).collect(),
            cwd: cwd.into(),
            variants: Variants::new(true, false, false),
            ..Default::default()
        }
    }

    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude = Some(pattern.into());
        self
    }

    pub fn outfile(mut self, outfile: impl Into<String>) -> Self {
        self.outfile = Some(outfile.into());
        self
    }

    pub fn plain(mut self, enabled: bool) -> Self {
        self.variants.plain = enabled;
        self
    }

    pub fn minify(mut self, enabled: bool) -> Self {
        self.variants.minified = enabled;
        self
    }

    pub fn coverage(mut self, enabled: bool) -> Self {
        self.variants.coverage = enabled;
        self
    }

    pub fn debug(mut self, enabled: bool) -> Self {
        self.debug = enabled;
        self
    }

    pub fn standalone(mut self, name: impl Into<String>) -> Self {
        self.standalone = Some(name.into());
        self
    }

    pub fn comments(mut self, policy: CommentPolicy) -> Self {
        self.comments = policy;
        self
    }

    pub fn watch(mut self, enabled: bool) -> Self {
        self.watch = enabled;
        self
    }

    /// Working directory made absolute, so every planned path is absolute.
    fn absolute_cwd(&self) -> PathBuf {
        std::path::absolute(&self.cwd).unwrap_or_else(|_| self.cwd.clone())
    }

    pub fn resolve_options(&self) -> ResolveOptions {
        ResolveOptions {
            cwd: self.absolute_cwd(),
            exclude: self.exclude.clone(),
            outfile: self.outfile.clone(),
            debug: self.debug,
        }
    }

    pub fn job_options(&self) -> JobOptions {
        JobOptions {
            variants: self.variants,
            standalone: self.standalone.clone(),
            comments: self.comments,
            watch: self.watch,
            cwd: self.absolute_cwd(),
        }
    }
}

/// The jobs planned for one entry file, or why they could not be planned.
#[derive(Debug)]
pub struct EntryPlan {
    pub file_set: FileSet,
    pub jobs: Result<Vec<Job>>,
}

/// Result of [`build`]: the job counts plus the jobs themselves, which a watch loop
/// can keep rebuilding.
#[derive(Debug)]
pub struct BuildOutcome {
    pub summary: RunSummary,
    /// Successfully planned jobs in entry order, with their engine handles.
    pub jobs: Vec<Job>,
}

/// Resolve patterns and plan the jobs of every matched entry file.
///
/// # Errors
///
/// Planning errors ([`Error::NoEntryFiles`], [`Error::NoMatchingFiles`],
/// [`Error::InvalidPattern`]) fail the whole plan. A malformed project manifest only
/// fails its entry's [`EntryPlan`].
pub async fn plan(options: &BuildOptions, cache: &FileCache) -> Result<Vec<EntryPlan>> {
    let file_sets = paths::resolve(&options.patterns, &options.resolve_options())?;
    let job_options = options.job_options();
    debug!(entries = file_sets.len(), "Resolved entry files");

    let mut plans = Vec::with_capacity(file_sets.len());
    for file_set in file_sets {
        let jobs = build_jobs(&file_set, &job_options, cache).await;
        plans.push(EntryPlan { file_set, jobs });
    }
    Ok(plans)
}

/// Plan and execute a run.
///
/// Jobs of one entry file run one after another; different entry files run
/// concurrently. Planning errors are emitted once on the scheduler's event sink and
/// returned; per-job failures are emitted and counted in the summary.
pub async fn build(
    options: &BuildOptions,
    scheduler: &Scheduler,
    cache: &FileCache,
) -> Result<BuildOutcome> {
    let plans = match plan(options, cache).await {
        Ok(plans) => plans,
        Err(error) => {
            scheduler.events().error(error.clone());
            return Err(error);
        }
    };

    let mut summary = RunSummary::default();
    let mut tasks = JoinSet::new();

    for (index, entry) in plans.into_iter().enumerate() {
        match entry.jobs {
            Ok(mut jobs) => {
                let scheduler = scheduler.clone();
                tasks.spawn(async move {
                    let entry_summary = scheduler.run(&mut jobs).await;
                    (index, entry_summary, jobs)
                });
            }
            Err(error) => {
                summary.failed += 1;
                scheduler.events().error(error);
            }
        }
    }

    let mut finished = Vec::with_capacity(tasks.len());
    while let Some(joined) = tasks.join_next().await {
        let (index, entry_summary, jobs) = joined.map_err(|e| Error::Task(e.to_string()))?;
        summary += entry_summary;
        finished.push((index, jobs));
    }
    finished.sort_by_key(|(index, _)| *index);

    info!(
        completed = summary.completed,
        failed = summary.failed,
        "Build finished"
    );

    Ok(BuildOutcome {
        summary,
        jobs: finished.into_iter().flat_map(|(_, jobs)| jobs).collect(),
    })
}
