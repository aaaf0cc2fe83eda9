use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use tierkit_catalog::{load_dependents, modified_packages};
use tierkit_core::{Catalog, PackageInfo, PatternFilter};
use tierkit_resolver::{
    build_matrix, expand_dependents, partition_tiers, select_seeds, PackageRequest,
    SelectionInputs, VersionSelector,
};
use tracing::info;

use crate::conan_flows::{
    export_invocation, lock_invocation, run_invocations, DEFAULT_LOCK_BUILD_PROFILE,
    DEFAULT_LOCK_HOST_PROFILES,
};
use crate::github::{commits_from_event_json, prefer_cli_list, GithubEnv};
use crate::render::{
    append_output_lines, format_tier_lines, format_tier_output, format_version_lines,
    print_lines, OutputStyle,
};
use crate::workspace::Workspace;
use crate::{ExportArgs, LockArgs, MatrixArgs, PackageFilterArgs, ReferencesArgs, TiersArgs};

#[derive(Debug, Serialize)]
struct VersionListing<'a> {
    package_reference: &'a str,
    package: &'a str,
    version: String,
    conanfile: String,
}

pub(crate) fn run_versions_command(workspace: &Workspace, json: bool) -> Result<()> {
    let catalog = workspace.catalog()?;
    if json {
        println!("packages={}", format_versions_json(&catalog)?);
    } else {
        print_lines(&format_version_lines(&catalog));
    }
    Ok(())
}

/// Newest version first within each package.
pub(crate) fn format_versions_json(catalog: &Catalog) -> Result<String> {
    let listing = catalog
        .package_names()
        .flat_map(|name| catalog.versions(name))
        .map(|info| VersionListing {
            package_reference: &info.package_reference,
            package: &info.package,
            version: info.version.to_string(),
            conanfile: info.conanfile_path().display().to_string(),
        })
        .collect::<Vec<_>>();
    serde_json::to_string(&listing).context("failed to encode package versions")
}

fn package_filter(
    workspace: &Workspace,
    args: &PackageFilterArgs,
    github: Option<&GithubEnv>,
) -> Result<PatternFilter> {
    let selection = workspace.selection_config(args.selection_config.as_deref())?;
    let include = prefer_cli_list(&args.include_packages, github, "package_include_patterns");
    let exclude = prefer_cli_list(&args.exclude_packages, github, "package_exclude_patterns");
    PatternFilter::with_overrides(&selection.packages, &include, &exclude)
}

fn selected_infos<'a>(catalog: &'a Catalog, filter: &PatternFilter) -> Vec<&'a PackageInfo> {
    catalog
        .infos()
        .into_iter()
        .filter(|info| filter.accepts(&info.package_reference))
        .collect()
}

fn requested_commits(cli: &[String], github: Option<&GithubEnv>) -> Vec<String> {
    if !cli.is_empty() {
        return cli.to_vec();
    }
    github.map(GithubEnv::commit_ids).unwrap_or_default()
}

fn output_sink(cli: Option<&Path>, github: Option<&GithubEnv>) -> Option<PathBuf> {
    cli.map(Path::to_path_buf)
        .or_else(|| github.and_then(GithubEnv::output_path))
}

fn modified_in_commits(workspace: &Workspace, commits: &[String]) -> Result<BTreeSet<String>> {
    if commits.is_empty() {
        return Ok(BTreeSet::new());
    }
    modified_packages(workspace.root(), &workspace.paths().recipes_prefix()?, commits)
}

pub(crate) fn run_references_command(
    workspace: &Workspace,
    github: Option<&GithubEnv>,
    args: &ReferencesArgs,
) -> Result<()> {
    let catalog = workspace.catalog()?;
    let filter = package_filter(workspace, &args.filter, github)?;
    let mut selected = selected_infos(&catalog, &filter);

    let commits = requested_commits(&args.commit_id, github);
    if !commits.is_empty() {
        let modified = modified_in_commits(workspace, &commits)?;
        selected.retain(|info| modified.contains(&info.package));
    }

    for info in &selected {
        println!("{}", info.package_reference);
    }

    if let Some(path) = output_sink(args.output.as_deref(), github) {
        let encoded = serde_json::to_string(&selected).context("failed to encode packages")?;
        append_output_lines(&path, &[format!("packages={encoded}")])?;
    }
    Ok(())
}

/// The explicit request from `--request`, `--package/--version` or the
/// workflow's `package`/`package_version` inputs, in that order.
pub(crate) fn resolve_request(
    args: &TiersArgs,
    github: Option<&GithubEnv>,
) -> Result<Option<PackageRequest>> {
    if let Some(request) = &args.request {
        return request.parse().map(Some);
    }

    let (package, version) = match &args.package {
        Some(package) => (Some(package.clone()), args.version.clone()),
        None => match github {
            Some(env) => (env.input("package"), env.input("package_version")),
            None => (None, None),
        },
    };
    let Some(package) = package else {
        return Ok(None);
    };
    if matches!(package.as_str(), "default" | "all") {
        return Ok(Some(PackageRequest::Defaults));
    }
    let selector = match version {
        Some(version) => version.parse()?,
        None => VersionSelector::Latest,
    };
    Ok(Some(PackageRequest::package(package, selector)))
}

pub(crate) fn run_tiers_command(
    workspace: &Workspace,
    github: Option<&GithubEnv>,
    args: &TiersArgs,
) -> Result<()> {
    let catalog = workspace.catalog()?;
    let filter = package_filter(workspace, &args.filter, github)?;
    let commits = requested_commits(&args.commit_id, github);
    let inputs = SelectionInputs {
        modified: modified_in_commits(workspace, &commits)?,
        request: resolve_request(args, github)?,
        scheduled: args.scheduled || github.is_some_and(GithubEnv::is_scheduled),
    };

    let graph_paths = args
        .graph
        .iter()
        .map(|path| workspace.paths().resolve(path))
        .collect::<Vec<_>>();
    let dependents = load_dependents(&catalog, &graph_paths)?;

    let seeds = select_seeds(&catalog, &filter, &inputs)?;
    let requested = expand_dependents(&catalog, &dependents, &seeds);
    let max_tier = args
        .max_tier
        .map(usize::from)
        .unwrap_or(workspace.config().max_tier);
    let tiers = partition_tiers(&requested, &dependents, max_tier)?;

    print_lines(&format_tier_lines(&tiers, max_tier));
    if let Some(path) = output_sink(args.output.as_deref(), github) {
        append_output_lines(&path, &format_tier_output(&tiers, max_tier)?)?;
        info!(output = %path.display(), "wrote tier output");
    }
    Ok(())
}

/// Package name of a recipe folder such as `recipes/glib/all`.
pub(crate) fn package_of_recipe_dir(directory: &Path) -> Result<String> {
    directory
        .parent()
        .and_then(Path::file_name)
        .map(|name| name.to_string_lossy().to_string())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| {
            anyhow!(
                "cannot derive package name from recipe folder '{}': expected <recipes>/<package>/<folder>",
                directory.display()
            )
        })
}

pub(crate) fn run_matrix_command(
    workspace: &Workspace,
    github: Option<&GithubEnv>,
    args: &MatrixArgs,
) -> Result<()> {
    let directory = args
        .directory
        .clone()
        .or_else(|| github.and_then(|env| env.input("directory")).map(PathBuf::from))
        .ok_or_else(|| anyhow!("matrix requires a recipe directory"))?;
    let version = args
        .version
        .clone()
        .or_else(|| github.and_then(|env| env.input("package_version")))
        .ok_or_else(|| anyhow!("matrix requires a package version"))?;
    let reference = format!("{}/{version}", package_of_recipe_dir(&directory)?);

    let selection = workspace.selection_config(args.selection_config.as_deref())?;
    let include = prefer_cli_list(&args.include_platforms, github, "platform_include_patterns");
    let exclude = prefer_cli_list(&args.exclude_platforms, github, "platform_exclude_patterns");
    let matrix = build_matrix(&reference, &selection, &include, &exclude)?;

    println!(
        "{}",
        serde_json::to_string_pretty(&matrix).context("failed to encode build matrix")?
    );
    if let Some(path) = output_sink(args.output.as_deref(), github) {
        let encoded = serde_json::to_string(&matrix).context("failed to encode build matrix")?;
        append_output_lines(&path, &[format!("configs={encoded}")])?;
    }
    Ok(())
}

pub(crate) fn run_commits_command() -> Result<()> {
    let event = std::env::var("GITHUB_EVENT").unwrap_or_default();
    let commits = commits_from_event_json(&event)?;
    println!(
        "commits={}",
        serde_json::to_string(&commits).context("failed to encode commits")?
    );
    Ok(())
}

pub(crate) fn run_export_command(
    workspace: &Workspace,
    args: &ExportArgs,
    style: OutputStyle,
) -> Result<()> {
    let catalog = workspace.catalog()?;
    let filter = package_filter(workspace, &args.filter, None)?;
    let conan = &workspace.config().conan;
    let invocations = selected_infos(&catalog, &filter)
        .into_iter()
        .map(|info| export_invocation(conan, info))
        .collect::<Vec<_>>();
    run_invocations(workspace.root(), &invocations, args.dry_run, style, "export")
}

pub(crate) fn run_lock_command(
    workspace: &Workspace,
    args: &LockArgs,
    style: OutputStyle,
) -> Result<()> {
    let catalog = workspace.catalog()?;
    let filter = package_filter(workspace, &args.filter, None)?;
    let conan = &workspace.config().conan;
    let host_profiles = if args.profiles.is_empty() {
        DEFAULT_LOCK_HOST_PROFILES
            .iter()
            .map(|profile| profile.to_string())
            .collect::<Vec<_>>()
    } else {
        args.profiles.clone()
    };
    let build_profile = workspace.profile_path(
        args.build_profile
            .as_deref()
            .unwrap_or(DEFAULT_LOCK_BUILD_PROFILE),
    );

    let mut invocations = Vec::new();
    for info in selected_infos(&catalog, &filter) {
        for host_profile in &host_profiles {
            invocations.push(lock_invocation(
                conan,
                info,
                &build_profile,
                &workspace.profile_path(host_profile),
                host_profile,
            ));
        }
    }
    run_invocations(workspace.root(), &invocations, args.dry_run, style, "lock")
}
