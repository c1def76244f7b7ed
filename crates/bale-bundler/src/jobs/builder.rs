use super::{Job, PostProcessor};
use crate::cache::FileCache;
use crate::engine::{BundleRequest, Transform, is_typescript};
use crate::manifest;
use crate::minify::{CommentPolicy, MinifyOptions};
use crate::{Error, FileSet, Result, Variant, Variants};
use std::path::PathBuf;
use tracing::debug;

/// Per-run settings shared by every job.
#[derive(Debug, Clone, Default)]
pub struct JobOptions {
    pub variants: Variants,
    /// UMD export name.
    pub standalone: Option<String>,
    pub comments: CommentPolicy,
    pub watch: bool,
    /// Where module resolution starts.
    pub cwd: PathBuf,
}

/// Plan one job per requested variant of `file_set`.
///
/// The first variant keeps the resolved output name; later ones get their marker
/// inserted before the extension of that same base name. Coverage bundles never carry
/// a source map.
///
/// # Errors
///
/// Returns [`Error::TransformConfig`] when the project manifest declares malformed
/// transforms.
pub async fn build_jobs(
    file_set: &FileSet,
    options: &JobOptions,
    cache: &FileCache,
) -> Result<Vec<Job>> {
    let project = manifest::project_transforms(&file_set.entry_file, cache)
        .await
        .map_err(|message| Error::TransformConfig {
            file_set: file_set.clone(),
            message,
        })?;

    let typescript = is_typescript(&file_set.entry_file);

    let jobs = options
        .variants
        .requested()
        .into_iter()
        .enumerate()
        .map(|(index, variant)| {
            let mut variant_set = if index == 0 {
                file_set.clone()
            } else {
                file_set.with_marker(variant.marker())
            };
            if variant == Variant::Coverage {
                variant_set = variant_set.without_source_map();
            }

            let mut transforms: Vec<Transform> =
                project.iter().cloned().map(Transform::Project).collect();
            let mut post_processor = None;
            match variant {
                Variant::Plain => {}
                Variant::Minified => {
                    transforms.push(Transform::Minify(MinifyOptions::per_module(
                        options.comments,
                    )));
                    post_processor = Some(PostProcessor::new(options.comments));
                }
                Variant::Coverage => transforms.push(Transform::Coverage),
            }

            debug!(
                variant = %variant,
                output = %variant_set.output_file.display(),
                transforms = transforms.len(),
                "Planned job"
            );

            let request = BundleRequest {
                entry: file_set.entry_file.clone(),
                base_dir: options.cwd.clone(),
                transforms,
                source_maps: variant_set.map_file.is_some(),
                standalone: options.standalone.clone(),
                typescript,
                watch: options.watch,
            };
            Job::new(variant_set, variant, request, post_processor)
        })
        .collect();

    Ok(jobs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::TransformSpec;
    use std::path::Path;
    use tempfile::TempDir;

    fn options(variants: Variants) -> JobOptions {
        JobOptions {
            variants,
            cwd: PathBuf::from("/p"),
            ..Default::default()
        }
    }

    fn outputs(jobs: &[Job]) -> Vec<(&Path, Option<&Path>)> {
        jobs.iter()
            .map(|j| (j.file_set.output_file.as_path(), j.file_set.map_file.as_deref()))
            .collect()
    }

    #[tokio::test]
    async fn test_defaults_to_plain_unsuffixed() {
        let file_set = FileSet::new("/nowhere/src/a.js", "/nowhere/dist/a.js");
        let jobs = build_jobs(&file_set, &options(Variants::default()), &FileCache::new())
            .await
            .unwrap();

        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].variant, Variant::Plain);
        assert_eq!(jobs[0].file_set, file_set);
        assert!(jobs[0].post_processor.is_none());
    }

    #[tokio::test]
    async fn test_single_variant_claims_unsuffixed_name() {
        let file_set = FileSet::new("/nowhere/a.js", "/nowhere/dist/a.js");
        let jobs = build_jobs(
            &file_set,
            &options(Variants::new(false, true, false)),
            &FileCache::new(),
        )
        .await
        .unwrap();

        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].variant, Variant::Minified);
        assert_eq!(jobs[0].file_set.output_file, PathBuf::from("/nowhere/dist/a.js"));
        assert!(jobs[0].post_processor.is_some());
    }

    #[tokio::test]
    async fn test_all_variants_get_distinct_paths() {
        let file_set =
            FileSet::new("/nowhere/a.js", "/nowhere/dist/a.js").with_source_map(true);
        let jobs = build_jobs(
            &file_set,
            &options(Variants::new(true, true, true)),
            &FileCache::new(),
        )
        .await
        .unwrap();

        assert_eq!(
            outputs(&jobs),
            vec![
                (Path::new("/nowhere/dist/a.js"), Some(Path::new("/nowhere/dist/a.js.map"))),
                (
                    Path::new("/nowhere/dist/a.min.js"),
                    Some(Path::new("/nowhere/dist/a.min.js.map"))
                ),
                (Path::new("/nowhere/dist/a.coverage.js"), None),
            ]
        );
        assert!(jobs[0].request.source_maps);
        assert!(!jobs[2].request.source_maps);
    }

    #[tokio::test]
    async fn test_coverage_alone_drops_map() {
        let file_set =
            FileSet::new("/nowhere/a.js", "/nowhere/dist/a.js").with_source_map(true);
        let jobs = build_jobs(
            &file_set,
            &options(Variants::new(false, false, true)),
            &FileCache::new(),
        )
        .await
        .unwrap();

        assert_eq!(jobs[0].file_set.output_file, PathBuf::from("/nowhere/dist/a.js"));
        assert!(jobs[0].file_set.map_file.is_none());
    }

    #[tokio::test]
    async fn test_transform_order() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("package.json"),
            r#"{"bale": {"transform": ["envify"]}}"#,
        )
        .unwrap();

        let file_set = FileSet::new(temp.path().join("a.ts"), temp.path().join("a.bundle.js"));
        let jobs = build_jobs(
            &file_set,
            &options(Variants::new(true, true, true)),
            &FileCache::new(),
        )
        .await
        .unwrap();

        let envify = Transform::Project(TransformSpec::new("envify"));
        assert_eq!(jobs[0].transforms(), &[envify.clone()]);
        assert_eq!(
            jobs[1].transforms(),
            &[
                envify.clone(),
                Transform::Minify(MinifyOptions::per_module(CommentPolicy::License))
            ]
        );
        assert_eq!(jobs[2].transforms(), &[envify, Transform::Coverage]);
        assert!(jobs.iter().all(|j| j.request.typescript));
    }

    #[tokio::test]
    async fn test_malformed_manifest_tags_entry() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("package.json"),
            r#"{"bale": {"transform": [7]}}"#,
        )
        .unwrap();

        let file_set = FileSet::new(temp.path().join("a.js"), temp.path().join("out.js"));
        let err = build_jobs(&file_set, &options(Variants::default()), &FileCache::new())
            .await
            .unwrap_err();

        match err {
            Error::TransformConfig { file_set: fs, .. } => assert_eq!(fs, file_set),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
