//! `bale plan` implementation: print every bundle a build would write.

use super::utils;
use crate::cli::PlanArgs;
use crate::config::ConfigOverrides;
use crate::error::{BuildError, Result, ResultExt};
use crate::ui;
use bale_bundler::{FileCache, Job, Transform, Variant};
use serde::Serialize;
use std::path::Path;

/// One planned bundle, as printed by `bale plan --json`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PlannedBundle<'a> {
    entry: &'a Path,
    variant: Variant,
    output: &'a Path,
    #[serde(skip_serializing_if = "Option::is_none")]
    map: Option<&'a Path>,
    transforms: &'a [Transform],
}

impl<'a> From<&'a Job> for PlannedBundle<'a> {
    fn from(job: &'a Job) -> Self {
        Self {
            entry: &job.file_set.entry_file,
            variant: job.variant,
            output: &job.file_set.output_file,
            map: job.file_set.map_file.as_deref(),
            transforms: job.transforms(),
        }
    }
}

/// Execute the plan command.
///
/// Planned bundles go to stdout. Entry files whose project transforms are
/// malformed are reported on stderr and make the command fail once the rest of
/// the plan has been printed.
pub async fn execute(args: PlanArgs) -> Result<()> {
    let (config, cwd) =
        utils::load_config(&args.planning, ConfigOverrides::from(&args.planning))?;
    config.validate()?;

    let plans = bale_bundler::plan(&config.to_build_options(&cwd), &FileCache::new()).await?;

    let mut bundles = Vec::new();
    let mut failed = 0;
    for entry in &plans {
        match &entry.jobs {
            Ok(jobs) => bundles.extend(jobs.iter().map(PlannedBundle::from)),
            Err(err) => {
                failed += 1;
                ui::error(&err.to_string());
            }
        }
    }

    if args.json {
        let json = serde_json::to_string_pretty(&bundles).context("Failed to encode plan")?;
        println!("{}", json);
    } else {
        for bundle in &bundles {
            println!("{}", format_line(bundle, &cwd));
        }
    }

    if failed > 0 {
        return Err(BuildError::PlanFailed(failed).into());
    }
    Ok(())
}

fn format_line(bundle: &PlannedBundle<'_>, cwd: &Path) -> String {
    let mut line = format!(
        "{:<9} {} -> {}",
        bundle.variant.as_str(),
        ui::display_path(bundle.entry, cwd),
        ui::display_path(bundle.output, cwd)
    );
    if let Some(map) = bundle.map {
        line.push_str(&format!(" (+ {})", ui::display_path(map, cwd)));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_line() {
        let bundle = PlannedBundle {
            entry: Path::new("/p/src/a.js"),
            variant: Variant::Minified,
            output: Path::new("/p/dist/a.min.js"),
            map: Some(Path::new("/p/dist/a.min.js.map")),
            transforms: &[],
        };
        assert_eq!(
            format_line(&bundle, Path::new("/p")),
            "minified  src/a.js -> dist/a.min.js (+ dist/a.min.js.map)"
        );
    }

    #[test]
    fn test_json_shape() {
        let bundle = PlannedBundle {
            entry: Path::new("/p/src/a.js"),
            variant: Variant::Coverage,
            output: Path::new("/p/dist/a.coverage.js"),
            map: None,
            transforms: &[Transform::Coverage],
        };
        let value = serde_json::to_value(&bundle).unwrap();
        assert_eq!(value["variant"], "coverage");
        assert_eq!(value["output"], "/p/dist/a.coverage.js");
        assert!(value.get("map").is_none());
        assert_eq!(value["transforms"][0]["kind"], "coverage");
    }
}
