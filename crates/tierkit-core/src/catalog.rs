use std::collections::BTreeMap;

use crate::error::SelectionError;
use crate::reference::PackageInfo;
use crate::version::RecipeVersion;

/// Every recipe version known to the corpus, keyed by package name.
///
/// Versions of a package are kept newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    packages: BTreeMap<String, Vec<PackageInfo>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, info: PackageInfo) {
        let versions = self.packages.entry(info.package.clone()).or_default();
        versions.retain(|existing| existing.version != info.version);
        versions.push(info);
        versions.sort_by(|a, b| b.version.cmp(&a.version));
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.packages.contains_key(name)
    }

    pub fn package_names(&self) -> impl Iterator<Item = &str> {
        self.packages.keys().map(String::as_str)
    }

    /// Versions of `name`, newest first. Empty when unknown.
    pub fn versions(&self, name: &str) -> &[PackageInfo] {
        self.packages.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn latest(&self, name: &str) -> Option<&PackageInfo> {
        self.versions(name).first()
    }

    pub fn latest_version(&self, name: &str) -> Result<RecipeVersion, SelectionError> {
        self.latest(name)
            .map(|info| info.version.clone())
            .ok_or_else(|| SelectionError::UnknownPackage {
                name: name.to_string(),
            })
    }

    pub fn find(&self, name: &str, version: &RecipeVersion) -> Option<&PackageInfo> {
        self.versions(name)
            .iter()
            .find(|info| &info.version == version)
    }

    /// All package infos ordered by package name, then ascending version.
    pub fn infos(&self) -> Vec<&PackageInfo> {
        self.packages
            .values()
            .flat_map(|versions| versions.iter().rev())
            .collect()
    }
}
