use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tierkit_catalog::RecipeCorpus;
use tierkit_core::{Catalog, SelectionConfig, WorkspaceConfig, WorkspacePaths};
use tracing::debug;

/// Paths and settings shared by every subcommand of one invocation.
#[derive(Debug, Clone)]
pub(crate) struct Workspace {
    paths: WorkspacePaths,
    config: WorkspaceConfig,
}

impl Workspace {
    pub(crate) fn load(root: Option<&Path>, config_path: Option<&Path>) -> Result<Self> {
        let root = match root {
            Some(root) => root.to_path_buf(),
            None => std::env::current_dir().context("failed to determine current directory")?,
        };
        let config = WorkspaceConfig::load(&root, config_path)?;
        debug!(root = %root.display(), ?config, "loaded workspace config");
        Ok(Self {
            paths: WorkspacePaths::from_config(root, &config),
            config,
        })
    }

    pub(crate) fn root(&self) -> &Path {
        self.paths.root()
    }

    pub(crate) fn paths(&self) -> &WorkspacePaths {
        &self.paths
    }

    pub(crate) fn config(&self) -> &WorkspaceConfig {
        &self.config
    }

    pub(crate) fn catalog(&self) -> Result<Catalog> {
        RecipeCorpus::open(&self.paths).load_catalog()
    }

    /// An explicit selection config must exist; the configured default is
    /// optional.
    pub(crate) fn selection_config(
        &self,
        explicit: Option<&Path>,
    ) -> Result<SelectionConfig> {
        if let Some(path) = explicit {
            return SelectionConfig::load(&self.paths.resolve(path));
        }
        let default_path = self.paths.resolve(&self.config.selection_config);
        if default_path.is_file() {
            SelectionConfig::load(&default_path)
        } else {
            debug!(path = %default_path.display(), "no selection config, using defaults");
            Ok(SelectionConfig::default())
        }
    }

    pub(crate) fn profile_path(&self, profile: &str) -> PathBuf {
        self.paths.resolve(&self.config.profiles_dir).join(profile)
    }
}
