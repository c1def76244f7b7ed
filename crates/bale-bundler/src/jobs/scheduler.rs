use super::Job;
use crate::engine::BundleEngine;
use crate::events::{BuildEvent, EventSink};
use crate::file_set::file_name_lossy;
use crate::minify::Minifier;
use crate::{Error, FileSet, Result, sourcemap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Counts of job outcomes for a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub completed: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn total(&self) -> usize {
        self.completed + self.failed
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

impl std::ops::AddAssign for RunSummary {
    fn add_assign(&mut self, other: Self) {
        self.completed += other.completed;
        self.failed += other.failed;
    }
}

/// Executes jobs against the engine and reports progress as [`BuildEvent`]s.
///
/// One `run` drains its jobs strictly one at a time; a failed job is reported and the
/// next one still starts. Clones share the engine and minifier, so one clone per entry
/// file may run concurrently.
#[derive(Clone)]
pub struct Scheduler {
    engine: Arc<dyn BundleEngine>,
    minifier: Option<Arc<dyn Minifier>>,
    events: EventSink,
}

impl Scheduler {
    pub fn new(engine: Arc<dyn BundleEngine>, events: EventSink) -> Self {
        Self {
            engine,
            minifier: None,
            events,
        }
    }

    /// Minifier for the whole-bundle pass of minified variants.
    pub fn with_minifier(mut self, minifier: Arc<dyn Minifier>) -> Self {
        self.minifier = Some(minifier);
        self
    }

    pub fn events(&self) -> &EventSink {
        &self.events
    }

    /// Build every job in order.
    pub async fn run(&self, jobs: &mut [Job]) -> RunSummary {
        let mut summary = RunSummary::default();

        for job in jobs.iter_mut() {
            self.events.emit(BuildEvent::Started(job.file_set.clone()));
            let start = Instant::now();

            match self.execute(job, &[]).await {
                Ok(()) => {
                    info!(
                        variant = %job.variant,
                        "Built {} in {}ms",
                        job.file_set.output_file.display(),
                        start.elapsed().as_millis()
                    );
                    summary.completed += 1;
                    self.events.emit(BuildEvent::End(job.file_set.clone()));
                }
                Err(error) => {
                    summary.failed += 1;
                    self.events.error(error);
                }
            }
        }

        summary
    }

    /// Rebuild a watched job after `changed` was modified.
    ///
    /// Emits `Update` first, then exactly one `End` or `Error`.
    pub async fn rebuild(&self, job: &mut Job, changed: &Path) -> Result<()> {
        self.events.emit(BuildEvent::Update {
            file_set: job.file_set.clone(),
            file: changed.to_path_buf(),
        });

        let result = self.execute(job, &[changed.to_path_buf()]).await;
        match &result {
            Ok(()) => self.events.emit(BuildEvent::End(job.file_set.clone())),
            Err(error) => self.events.error(error.clone()),
        }
        result
    }

    /// One build of `job`: engine first, then the optional whole-bundle pass.
    async fn execute(&self, job: &mut Job, changed: &[PathBuf]) -> Result<()> {
        let file_set = job.file_set.clone();
        let build_error = |message: String| Error::BundleBuild {
            file_set: file_set.clone(),
            message,
        };

        prepare_output(&file_set.output_file)
            .await
            .map_err(build_error)?;
        if let Some(map_file) = &file_set.map_file {
            prepare_output(map_file).await.map_err(build_error)?;
        }

        let engine = &self.engine;
        let request = &job.request;
        let handle = job
            .handle
            .get_or_insert_with(|| engine.handle(request.clone()));

        let logger = self.events.logger(&file_set);
        let output = handle
            .bundle(changed, &logger)
            .await
            .map_err(|e| build_error(e.to_string()))?;

        if !output.dependencies.is_empty() {
            debug!(
                entry = %file_set.entry_file.display(),
                count = output.dependencies.len(),
                "Dependency graph updated"
            );
            job.dependencies = output.dependencies;
        }

        let written = write_bundle(&file_set, output.code)
            .await
            .map_err(build_error)?;
        if written == 0 {
            warn!("Engine produced an empty bundle for {}", file_set.entry_file.display());
        }

        if let Some(post_processor) = &job.post_processor {
            let minifier = self.minifier.as_deref().ok_or_else(|| Error::PostProcess {
                file_set: file_set.clone(),
                bundle: file_set.output_file.clone(),
                message: "No minifier configured for the whole-bundle pass".to_string(),
            })?;
            post_processor.run(&file_set, minifier).await?;
        }

        Ok(())
    }
}

/// Create parent directories and an empty placeholder so later writes cannot fail on a
/// missing path. Existing content is left alone.
async fn prepare_output(path: &Path) -> std::result::Result<(), String> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| format!("Failed to create directory {}: {}", parent.display(), e))?;
    }

    tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .map_err(|e| format!("Failed to create {}: {}", path.display(), e))?;
    Ok(())
}

/// Write the bundle, moving an inline source map into the map file when one is
/// declared. Returns the number of bundle bytes written.
async fn write_bundle(file_set: &FileSet, mut code: Vec<u8>) -> std::result::Result<usize, String> {
    if let Some(map_file) = &file_set.map_file {
        let map_dir = map_file.parent().unwrap_or_else(|| Path::new("."));
        let (stripped, map) = sourcemap::split_inline_map(&code, map_dir)?;
        code = stripped;

        match map {
            Some(mut map) => {
                sourcemap::set_file(&mut map, &file_set.output_name());
                let json = serde_json::to_vec(&map)
                    .map_err(|e| format!("Failed to encode source map: {}", e))?;
                tokio::fs::write(map_file, json)
                    .await
                    .map_err(|e| format!("Failed to write {}: {}", map_file.display(), e))?;
                sourcemap::append_link_comment(&mut code, &file_name_lossy(map_file));
            }
            None => debug!(
                "No inline source map in output for {}",
                file_set.entry_file.display()
            ),
        }
    }

    tokio::fs::write(&file_set.output_file, &code)
        .await
        .map_err(|e| format!("Failed to write {}: {}", file_set.output_file.display(), e))?;
    Ok(code.len())
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("minifier", &self.minifier.is_some())
            .finish_non_exhaustive()
    }
}
