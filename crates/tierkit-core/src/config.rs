use std::fs;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

pub const WORKSPACE_CONFIG_FILE: &str = "tierkit.toml";
pub const DEFAULT_RECIPES_DIR: &str = "recipes";
pub const DEFAULT_SELECTION_CONFIG: &str = "defaults.yml";
pub const DEFAULT_MAX_TIER: usize = 9;
/// Largest accepted `max_tier`; one CI stage exists per tier index.
pub const MAX_TIER_LIMIT: usize = 255;
pub const DEFAULT_PROFILES_DIR: &str = ".github/config/conan/profiles";

fn default_recipes_dir() -> PathBuf {
    PathBuf::from(DEFAULT_RECIPES_DIR)
}

fn default_selection_config() -> PathBuf {
    PathBuf::from(DEFAULT_SELECTION_CONFIG)
}

fn default_max_tier() -> usize {
    DEFAULT_MAX_TIER
}

fn default_profiles_dir() -> PathBuf {
    PathBuf::from(DEFAULT_PROFILES_DIR)
}

fn default_conan() -> String {
    "conan".to_string()
}

/// Settings read from `tierkit.toml`; every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkspaceConfig {
    #[serde(default = "default_recipes_dir")]
    pub recipes_dir: PathBuf,
    #[serde(default = "default_selection_config")]
    pub selection_config: PathBuf,
    /// Highest tier index the CI workflow has a build stage for.
    #[serde(default = "default_max_tier")]
    pub max_tier: usize,
    /// Conan profile files used by `lock`.
    #[serde(default = "default_profiles_dir")]
    pub profiles_dir: PathBuf,
    #[serde(default = "default_conan")]
    pub conan: String,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            recipes_dir: default_recipes_dir(),
            selection_config: default_selection_config(),
            max_tier: default_max_tier(),
            profiles_dir: default_profiles_dir(),
            conan: default_conan(),
        }
    }
}

impl WorkspaceConfig {
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let config: Self = toml::from_str(input).context("failed to parse tierkit.toml")?;
        if config.max_tier > MAX_TIER_LIMIT {
            anyhow::bail!(
                "max_tier {} exceeds the supported limit of {MAX_TIER_LIMIT}",
                config.max_tier
            );
        }
        Ok(config)
    }

    /// Reads `path` when given, else `<root>/tierkit.toml` if it exists.
    pub fn load(root: &Path, path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let candidate = root.join(WORKSPACE_CONFIG_FILE);
                if !candidate.is_file() {
                    return Ok(Self::default());
                }
                candidate
            }
        };
        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed reading workspace config: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("invalid workspace config: {}", path.display()))
    }
}

/// Filesystem locations of one run, resolved against the workspace root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspacePaths {
    root: PathBuf,
    recipes_dir: PathBuf,
}

impl WorkspacePaths {
    pub fn new(root: impl Into<PathBuf>, recipes_dir: impl AsRef<Path>) -> Self {
        let root = root.into();
        let recipes_dir = root.join(recipes_dir);
        Self { root, recipes_dir }
    }

    pub fn from_config(root: impl Into<PathBuf>, config: &WorkspaceConfig) -> Self {
        Self::new(root, &config.recipes_dir)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn recipes_dir(&self) -> &Path {
        &self.recipes_dir
    }

    /// Path of the recipes directory relative to the root, `/` separated as
    /// git reports changed files, e.g. `conan/recipes`. Empty when the
    /// recipes live directly in the root.
    pub fn recipes_prefix(&self) -> Result<String> {
        let relative = self.recipes_dir.strip_prefix(&self.root).with_context(|| {
            format!(
                "recipes directory {} is not inside the workspace root {}",
                self.recipes_dir.display(),
                self.root.display()
            )
        })?;
        let mut parts = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(part) => parts.push(part.to_string_lossy().to_string()),
                Component::CurDir => {}
                _ => anyhow::bail!(
                    "recipes directory {} is not inside the workspace root {}",
                    self.recipes_dir.display(),
                    self.root.display()
                ),
            }
        }
        Ok(parts.join("/"))
    }

    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}
