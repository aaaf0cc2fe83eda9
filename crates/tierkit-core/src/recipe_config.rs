use std::collections::BTreeMap;

use anyhow::Context;
use serde::Deserialize;

use crate::version::RecipeVersion;

/// Contents of a recipe folder's `config.yml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RecipeConfig {
    pub versions: BTreeMap<String, RecipeVersionEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RecipeVersionEntry {
    pub folder: String,
}

impl RecipeConfig {
    pub fn from_yaml_str(input: &str) -> anyhow::Result<Self> {
        let config: Self =
            serde_yaml::from_str(input).context("failed to parse recipe config.yml")?;
        for (version, entry) in &config.versions {
            if version.trim().is_empty() {
                anyhow::bail!("recipe config declares an empty version");
            }
            if entry.folder.trim().is_empty() {
                anyhow::bail!("version '{version}' has an empty folder");
            }
        }
        Ok(config)
    }

    /// Declared versions paired with their folders, ascending.
    pub fn entries(&self) -> Vec<(RecipeVersion, &str)> {
        let mut entries = self
            .versions
            .iter()
            .map(|(version, entry)| (RecipeVersion::new(version.as_str()), entry.folder.as_str()))
            .collect::<Vec<_>>();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }
}
