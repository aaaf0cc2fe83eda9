use std::collections::BTreeSet;
use std::path::{Component, Path};
use std::process::Command;

use anyhow::{Context, Result};
use tracing::{debug, info};

pub(crate) fn base_git_command() -> Command {
    let mut command = Command::new("git");
    command.arg("-c").arg("core.quotepath=false");
    if cfg!(windows) {
        command.arg("-c").arg("core.longpaths=true");
    }
    command
}

/// Paths touched by `commit_id` relative to its parent (or to the empty tree
/// for a root commit).
pub fn files_in_commit(repo_root: &Path, commit_id: &str) -> Result<Vec<String>> {
    let output = base_git_command()
        .arg("diff-tree")
        .arg("--no-commit-id")
        .arg("--name-only")
        .arg("--root")
        .arg("-r")
        .arg(commit_id)
        .current_dir(repo_root)
        .output()
        .with_context(|| format!("failed launching git diff-tree for commit '{commit_id}'"))?;
    if !output.status.success() {
        anyhow::bail!(
            "git diff-tree failed for commit '{}': {}",
            commit_id,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    let stdout = String::from_utf8(output.stdout)
        .with_context(|| format!("git diff-tree produced non-UTF-8 output for '{commit_id}'"))?;
    Ok(stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Package name of a recipe file path such as `recipes/<name>/all/conanfile.py`,
/// where `recipes_prefix` is the root-relative recipes directory.
pub fn package_of_path(path: &str, recipes_prefix: &str) -> Option<String> {
    let prefix = recipes_prefix
        .split('/')
        .filter(|part| !part.is_empty() && *part != ".")
        .collect::<Vec<_>>();
    let components = Path::new(path)
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().to_string()),
            _ => None,
        })
        .collect::<Vec<_>>();
    if components.len() < prefix.len() + 2 {
        return None;
    }
    if components
        .iter()
        .zip(&prefix)
        .any(|(part, expected)| part.as_str() != *expected)
    {
        return None;
    }
    Some(components[prefix.len()].clone())
}

/// Packages whose recipe folders were touched by any of `commit_ids`.
pub fn modified_packages<S: AsRef<str>>(
    repo_root: &Path,
    recipes_prefix: &str,
    commit_ids: &[S],
) -> Result<BTreeSet<String>> {
    let mut packages = BTreeSet::new();
    for commit_id in commit_ids {
        let commit_id = commit_id.as_ref();
        let files = files_in_commit(repo_root, commit_id)?;
        let before = packages.len();
        for file in &files {
            if let Some(package) = package_of_path(file, recipes_prefix) {
                debug!(commit = commit_id, file = %file, package = %package, "recipe touched");
                packages.insert(package);
            }
        }
        info!(
            commit = commit_id,
            files = files.len(),
            new_packages = packages.len() - before,
            "inspected commit"
        );
    }
    Ok(packages)
}
