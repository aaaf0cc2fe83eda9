use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tierkit_core::{Catalog, PackageInfo, RecipeConfig, WorkspacePaths};
use tracing::{debug, info, warn};

pub const RECIPE_CONFIG_FILE: &str = "config.yml";

/// A directory of recipe folders, each described by a `config.yml`.
#[derive(Debug, Clone)]
pub struct RecipeCorpus {
    root: PathBuf,
    recipes_dir: PathBuf,
}

impl RecipeCorpus {
    pub fn open(paths: &WorkspacePaths) -> Self {
        Self {
            root: paths.root().to_path_buf(),
            recipes_dir: paths.recipes_dir().to_path_buf(),
        }
    }

    /// Reads every recipe folder into a catalog.
    ///
    /// Folders without `config.yml` are skipped; an unreadable or malformed
    /// `config.yml` aborts the whole load.
    pub fn load_catalog(&self) -> Result<Catalog> {
        let mut entries = fs::read_dir(&self.recipes_dir)
            .with_context(|| {
                format!(
                    "failed to read recipes directory: {}",
                    self.recipes_dir.display()
                )
            })?
            .collect::<std::io::Result<Vec<_>>>()
            .with_context(|| {
                format!(
                    "failed to list recipes directory: {}",
                    self.recipes_dir.display()
                )
            })?;
        entries.sort_by_key(|entry| entry.file_name());

        let mut catalog = Catalog::new();
        for entry in entries {
            let file_type = entry
                .file_type()
                .with_context(|| format!("failed to inspect {}", entry.path().display()))?;
            if !file_type.is_dir() {
                continue;
            }
            let package_dir = entry.path();
            let package_name = entry.file_name().to_string_lossy().to_string();
            let config_path = package_dir.join(RECIPE_CONFIG_FILE);
            if !config_path.is_file() {
                warn!(package = %package_name, "recipe folder has no config.yml, skipping");
                continue;
            }

            for info in self.read_package(&package_name, &package_dir, &config_path)? {
                debug!(reference = %info.package_reference, "catalogued recipe");
                catalog.insert(info);
            }
        }

        if catalog.is_empty() {
            warn!(recipes_dir = %self.recipes_dir.display(), "no recipes found");
        }
        info!(
            packages = catalog.len(),
            recipes_dir = %self.recipes_dir.display(),
            "loaded recipe catalog"
        );
        Ok(catalog)
    }

    fn read_package(
        &self,
        package_name: &str,
        package_dir: &Path,
        config_path: &Path,
    ) -> Result<Vec<PackageInfo>> {
        let content = fs::read_to_string(config_path)
            .with_context(|| format!("failed reading recipe config: {}", config_path.display()))?;
        let config = RecipeConfig::from_yaml_str(&content)
            .with_context(|| format!("invalid recipe config: {}", config_path.display()))?;

        let mut infos = Vec::new();
        for (version, folder) in config.entries() {
            let absolute = package_dir.join(folder);
            let directory = absolute
                .strip_prefix(&self.root)
                .map(Path::to_path_buf)
                .unwrap_or(absolute);
            infos.push(PackageInfo::new(package_name, version, directory));
        }
        Ok(infos)
    }
}
