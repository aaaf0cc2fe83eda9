use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Serialize;

use crate::version::RecipeVersion;

/// `name/version`, optionally followed by `@user/channel` or `#revision`
/// suffixes which are dropped when parsing.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PackageReference {
    pub name: String,
    pub version: RecipeVersion,
}

impl PackageReference {
    pub fn new(name: impl Into<String>, version: impl Into<RecipeVersion>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

impl FromStr for PackageReference {
    type Err = anyhow::Error;

    fn from_str(input: &str) -> anyhow::Result<Self> {
        let trimmed = input.trim();
        let without_revision = trimmed.split('#').next().unwrap_or_default();
        let without_channel = without_revision.split('@').next().unwrap_or_default();
        let Some((name, version)) = without_channel.split_once('/') else {
            anyhow::bail!("invalid package reference '{trimmed}': expected name/version");
        };
        if name.trim().is_empty() {
            anyhow::bail!("invalid package reference '{trimmed}': empty name");
        }
        if version.trim().is_empty() {
            anyhow::bail!("invalid package reference '{trimmed}': empty version");
        }
        Ok(Self::new(name.trim(), version))
    }
}

impl fmt::Display for PackageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.version)
    }
}

/// One buildable recipe version read from the corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageInfo {
    pub package: String,
    pub version: RecipeVersion,
    pub package_reference: String,
    /// Recipe folder relative to the workspace root.
    pub directory: PathBuf,
    pub conanfile: PathBuf,
    pub test_conanfile: PathBuf,
}

impl PackageInfo {
    pub fn new(package: &str, version: RecipeVersion, directory: PathBuf) -> Self {
        Self {
            package: package.to_string(),
            package_reference: format!("{package}/{version}"),
            version,
            directory,
            conanfile: PathBuf::from("conanfile.py"),
            test_conanfile: PathBuf::from("test_package").join("conanfile.py"),
        }
    }

    pub fn reference(&self) -> PackageReference {
        PackageReference::new(self.package.clone(), self.version.clone())
    }

    pub fn conanfile_path(&self) -> PathBuf {
        self.directory.join(&self.conanfile)
    }
}
