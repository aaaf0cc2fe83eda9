use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use serde::Serialize;
use tierkit_core::{PackageReference, RecipeVersion};

/// Which versions of a package a request asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSelector {
    Latest,
    All,
    Exact(RecipeVersion),
}

impl FromStr for VersionSelector {
    type Err = anyhow::Error;

    fn from_str(input: &str) -> anyhow::Result<Self> {
        match input.trim() {
            "" => Err(anyhow!("version selector must not be empty")),
            "latest" => Ok(Self::Latest),
            "all" => Ok(Self::All),
            exact => Ok(Self::Exact(RecipeVersion::new(exact))),
        }
    }
}

impl fmt::Display for VersionSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latest => f.write_str("latest"),
            Self::All => f.write_str("all"),
            Self::Exact(version) => write!(f, "{version}"),
        }
    }
}

/// An explicit rebuild request from the command line or a workflow input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageRequest {
    /// Every package of the default subset at its latest version.
    Defaults,
    Package {
        name: String,
        selector: VersionSelector,
    },
}

impl PackageRequest {
    pub fn package(name: impl Into<String>, selector: VersionSelector) -> Self {
        Self::Package {
            name: name.into(),
            selector,
        }
    }
}

impl FromStr for PackageRequest {
    type Err = anyhow::Error;

    /// Accepts `default`, `all`, `<name>` or `<name>/<latest|all|version>`.
    fn from_str(input: &str) -> anyhow::Result<Self> {
        let trimmed = input.trim();
        match trimmed {
            "" => Err(anyhow!("package request must not be empty")),
            "default" | "all" => Ok(Self::Defaults),
            _ => {
                let (name, selector) = match trimmed.split_once('/') {
                    Some((name, selector)) => (name.trim(), selector.parse()?),
                    None => (trimmed, VersionSelector::Latest),
                };
                if name.is_empty() {
                    anyhow::bail!("package request '{trimmed}' has an empty name");
                }
                Ok(Self::package(name, selector))
            }
        }
    }
}

/// Package name to the versions selected for rebuild.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RequestedSet {
    packages: BTreeMap<String, BTreeSet<RecipeVersion>>,
}

impl RequestedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, version: RecipeVersion) -> bool {
        self.packages
            .entry(name.to_string())
            .or_default()
            .insert(version)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.packages.contains_key(name)
    }

    pub fn versions(&self, name: &str) -> Option<&BTreeSet<RecipeVersion>> {
        self.packages.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.packages.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    pub fn remove(&mut self, name: &str) -> Option<BTreeSet<RecipeVersion>> {
        self.packages.remove(name)
    }

    /// Every selected `name/version`, ordered by name then version.
    pub fn references(&self) -> Vec<PackageReference> {
        self.packages
            .iter()
            .flat_map(|(name, versions)| {
                versions
                    .iter()
                    .map(move |version| PackageReference::new(name.clone(), version.clone()))
            })
            .collect()
    }
}

/// One build stage: no member is a recorded dependent of another member.
pub type Tier = RequestedSet;
