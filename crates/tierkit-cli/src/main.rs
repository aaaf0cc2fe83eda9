use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use tracing_subscriber::EnvFilter;

mod command_flows;
mod completion;
mod conan_flows;
mod dispatch;
mod github;
mod render;
mod workspace;

use render::ColorChoice;

#[derive(Parser, Debug)]
#[command(name = "tierkit", version)]
#[command(about = "Selects recipe packages to rebuild and orders them into build tiers", long_about = None)]
struct Cli {
    /// Workspace root holding the recipes directory (defaults to the current directory)
    #[arg(long, global = true)]
    root: Option<PathBuf>,
    /// Workspace config file (defaults to <root>/tierkit.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log debug detail to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    color: ColorChoice,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List every recipe and its versions
    Versions {
        /// Print `packages=<json>` instead of one line per package
        #[arg(long)]
        json: bool,
    },
    /// List package references passing the selection filter
    References(ReferencesArgs),
    /// Select packages to rebuild and split them into build tiers
    Tiers(TiersArgs),
    /// List the build jobs of one recipe version
    Matrix(MatrixArgs),
    /// Print the commit ids of the `$GITHUB_EVENT` payload
    Commits,
    /// Run `conan export` for selected references
    Export(ExportArgs),
    /// Run `conan lock create` for selected references
    Lock(LockArgs),
    /// Print a shell completion script
    Completions { shell: Shell },
}

#[derive(Args, Debug, Clone, Default)]
struct PackageFilterArgs {
    /// Glob patterns over `name/version` to include
    #[arg(long, num_args = 1..)]
    include_packages: Vec<String>,
    /// Glob patterns over `name/version` to exclude
    #[arg(long, num_args = 1..)]
    exclude_packages: Vec<String>,
    /// Selection config (defaults.yml) with package, platform and profile patterns
    #[arg(long)]
    selection_config: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
struct ReferencesArgs {
    #[command(flatten)]
    filter: PackageFilterArgs,
    /// Keep only packages modified by these commits
    #[arg(long, num_args = 1..)]
    commit_id: Vec<String>,
    /// File receiving `packages=<json>` (defaults to $GITHUB_OUTPUT on GitHub Actions)
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
struct TiersArgs {
    #[command(flatten)]
    filter: PackageFilterArgs,
    /// `default`, `all`, `<name>` or `<name>/<latest|all|version>`
    #[arg(long, conflicts_with = "package")]
    request: Option<String>,
    /// Package to rebuild
    #[arg(long)]
    package: Option<String>,
    /// Version of --package: `latest`, `all` or an explicit version
    #[arg(long, requires = "package")]
    version: Option<String>,
    /// Commits whose modified recipes are rebuilt
    #[arg(long, num_args = 1..)]
    commit_id: Vec<String>,
    /// Dependency graph JSON documents from `conan graph info`
    #[arg(long, num_args = 1..)]
    graph: Vec<PathBuf>,
    /// Rebuild the default package subset, as a scheduled run does
    #[arg(long)]
    scheduled: bool,
    /// Highest tier index with a CI stage (overrides tierkit.toml)
    #[arg(
        long,
        value_parser = clap::value_parser!(u16).range(0..=tierkit_core::MAX_TIER_LIMIT as i64)
    )]
    max_tier: Option<u16>,
    /// File receiving `packages_<i>=<json>` lines (defaults to $GITHUB_OUTPUT on GitHub Actions)
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
struct MatrixArgs {
    /// Recipe folder containing conanfile.py, e.g. recipes/glib/all
    directory: Option<PathBuf>,
    /// Version of the package
    version: Option<String>,
    #[arg(long, num_args = 1..)]
    include_platforms: Vec<String>,
    #[arg(long, num_args = 1..)]
    exclude_platforms: Vec<String>,
    #[arg(long)]
    selection_config: Option<PathBuf>,
    /// File receiving `configs=<json>` (defaults to $GITHUB_OUTPUT on GitHub Actions)
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
struct ExportArgs {
    #[command(flatten)]
    filter: PackageFilterArgs,
    /// Print the commands without running them
    #[arg(long)]
    dry_run: bool,
}

#[derive(Args, Debug, Clone)]
struct LockArgs {
    #[command(flatten)]
    filter: PackageFilterArgs,
    /// Host profiles to lock for
    #[arg(long, num_args = 1..)]
    profiles: Vec<String>,
    /// Build profile name inside the profiles directory
    #[arg(long)]
    build_profile: Option<String>,
    /// Print the commands without running them
    #[arg(long)]
    dry_run: bool,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    dispatch::run_cli(cli)
}
