use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tierkit_core::{Catalog, DependentsMap, PackageReference};
use tracing::{debug, info};

/// A dependency graph exported by a previous `conan graph info --format=json`.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphDocument {
    pub graph: GraphBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphBody {
    #[serde(default)]
    pub nodes: BTreeMap<String, GraphNode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphNode {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "ref")]
    pub reference: Option<String>,
    #[serde(default)]
    pub dependencies: BTreeMap<String, GraphDependency>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphDependency {
    #[serde(rename = "ref")]
    pub reference: String,
}

impl GraphDocument {
    pub fn from_json_str(input: &str) -> Result<Self> {
        serde_json::from_str(input).context("failed to parse dependency graph document")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed reading dependency graph: {}", path.display()))?;
        Self::from_json_str(&content)
            .with_context(|| format!("invalid dependency graph: {}", path.display()))
    }

    /// Adds an edge for every dependency between two catalogued packages.
    pub fn collect_dependents(&self, catalog: &Catalog, dependents: &mut DependentsMap) -> usize {
        let mut added = 0;
        for node in self.graph.nodes.values() {
            let Some(dependent) = node.package_name() else {
                continue;
            };
            if !catalog.contains(&dependent) {
                continue;
            }
            for dependency in node.dependencies.values() {
                let Ok(reference) = dependency.reference.parse::<PackageReference>() else {
                    continue;
                };
                if !catalog.contains(&reference.name) {
                    continue;
                }
                if dependents.add_edge(&reference.name, &dependent) {
                    debug!(dependency = %reference.name, dependent = %dependent, "recorded dependent");
                    added += 1;
                }
            }
        }
        added
    }
}

impl GraphNode {
    fn package_name(&self) -> Option<String> {
        if let Some(name) = self.name.as_deref().filter(|name| !name.trim().is_empty()) {
            return Some(name.trim().to_string());
        }
        self.reference
            .as_deref()
            .and_then(|reference| reference.parse::<PackageReference>().ok())
            .map(|reference| reference.name)
    }
}

/// Folds every graph document into a single dependents map. Later documents
/// only add edges.
pub fn load_dependents<P: AsRef<Path>>(catalog: &Catalog, paths: &[P]) -> Result<DependentsMap> {
    let mut dependents = DependentsMap::new();
    for path in paths {
        let path = path.as_ref();
        let document = GraphDocument::load(path)?;
        let added = document.collect_dependents(catalog, &mut dependents);
        info!(graph = %path.display(), edges = added, "loaded dependency graph");
    }
    debug!(
        graphs = paths.len(),
        edges = dependents.edge_count(),
        "built dependents map"
    );
    Ok(dependents)
}
