use super::validation::{parse_comments, parse_standalone};
use bale_bundler::CommentPolicy;
use clap::{Args, Subcommand};
use std::path::PathBuf;

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build every bundle planned from the given patterns
    ///
    /// Each matched entry file produces one bundle per requested variant. Bundles
    /// of one entry file are built in order; different entry files build
    /// concurrently.
    Build(BuildArgs),

    /// Print the bundles a build would write, without running the engine
    Plan(PlanArgs),
}

/// Options shared by every command that plans bundles.
#[derive(Args, Debug, Clone, Default)]
pub struct PlanningArgs {
    /// Entry files or glob patterns, relative to the working directory
    ///
    /// Falls back to `patterns` in bale.config.json when omitted.
    #[arg(value_name = "PATTERNS")]
    pub patterns: Vec<String>,

    /// Glob of files to leave out of the matched entries
    #[arg(short = 'x', long, value_name = "GLOB")]
    pub exclude: Option<String>,

    /// Output naming pattern
    ///
    /// A path ending in `/`, or whose file name has no dot, is a directory that
    /// mirrors each entry's location under it. A `*` is replaced by the entry's base name, e.g.
    /// `dist/*.bundle.js`. Anything else is a literal file name. Defaults to
    /// `<entry>.bundle.js` next to each entry.
    #[arg(short, long, value_name = "PATH")]
    pub outfile: Option<String>,

    /// Also build a minified bundle (`.min` marker when sharing a name)
    #[arg(short, long)]
    pub minify: bool,

    /// Also build a coverage-instrumented bundle (`.coverage` marker)
    #[arg(long)]
    pub coverage: bool,

    /// Skip the plain bundle
    #[arg(long)]
    pub no_plain: bool,

    /// Write a `.map` source map next to every bundle except coverage ones
    #[arg(short, long)]
    pub debug: bool,

    /// Export the bundle as a UMD module under this global name
    #[arg(short, long, value_name = "NAME", value_parser = parse_standalone)]
    pub standalone: Option<String>,

    /// Which comments survive minification (none, license, all)
    #[arg(long, value_name = "POLICY", value_parser = parse_comments)]
    pub comments: Option<CommentPolicy>,

    /// Path to a config file (default: bale.config.json in the working directory)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Working directory patterns and outputs are resolved against
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,
}

/// Arguments for `bale build`.
#[derive(Args, Debug, Clone, Default)]
pub struct BuildArgs {
    #[command(flatten)]
    pub planning: PlanningArgs,

    /// Keep running and rebuild bundles whose sources change
    #[arg(short, long)]
    pub watch: bool,

    /// Bundling engine command, e.g. 'node scripts/bundle.mjs'
    ///
    /// The command receives the bundle request as JSON on stdin and must print
    /// the bundle on stdout.
    #[arg(long, value_name = "COMMAND")]
    pub engine: Option<String>,

    /// Whole-bundle minifier command used for the second minification pass
    #[arg(long, value_name = "COMMAND")]
    pub minifier: Option<String>,
}

/// Arguments for `bale plan`.
#[derive(Args, Debug, Clone, Default)]
pub struct PlanArgs {
    #[command(flatten)]
    pub planning: PlanningArgs,

    /// Print the plan as JSON
    #[arg(long)]
    pub json: bool,
}
