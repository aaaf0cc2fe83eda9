use std::collections::{BTreeMap, BTreeSet};

/// Reverse dependency edges: package name to the packages that directly
/// depend on it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependentsMap {
    edges: BTreeMap<String, BTreeSet<String>>,
}

static NO_DEPENDENTS: BTreeSet<String> = BTreeSet::new();

impl DependentsMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `dependent` requires `dependency`. Self edges are ignored.
    pub fn add_edge(&mut self, dependency: &str, dependent: &str) -> bool {
        if dependency == dependent {
            return false;
        }
        self.edges
            .entry(dependency.to_string())
            .or_default()
            .insert(dependent.to_string())
    }

    pub fn dependents_of(&self, name: &str) -> &BTreeSet<String> {
        self.edges.get(name).unwrap_or(&NO_DEPENDENTS)
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(BTreeSet::len).sum()
    }
}
