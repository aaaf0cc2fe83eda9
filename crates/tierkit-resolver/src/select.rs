use std::collections::{BTreeSet, VecDeque};

use anyhow::Result;
use tierkit_core::{Catalog, DependentsMap, PatternFilter, SelectionError};
use tracing::{debug, info, warn};

use crate::types::{PackageRequest, RequestedSet, VersionSelector};

/// Seed sources for one run.
#[derive(Debug, Clone, Default)]
pub struct SelectionInputs {
    /// Packages whose recipe folders changed.
    pub modified: BTreeSet<String>,
    pub request: Option<PackageRequest>,
    /// A scheduled run rebuilds the default subset whatever else was asked.
    pub scheduled: bool,
}

/// Merges modified packages, the explicit request and the scheduled flag
/// into a single requested set.
///
/// `defaults` decides which packages the `default` request covers and which
/// modified packages are eligible; explicit package requests bypass it.
pub fn select_seeds(
    catalog: &Catalog,
    defaults: &PatternFilter,
    inputs: &SelectionInputs,
) -> Result<RequestedSet> {
    let mut requested = RequestedSet::new();

    for name in &inputs.modified {
        let Some(latest) = catalog.latest(name) else {
            warn!(package = %name, "modified package has no catalog entry, skipping");
            continue;
        };
        if !defaults.accepts(&latest.package_reference) {
            debug!(reference = %latest.package_reference, "modified package filtered out");
            continue;
        }
        requested.insert(name, latest.version.clone());
    }

    if inputs.scheduled || matches!(inputs.request, Some(PackageRequest::Defaults)) {
        for name in catalog.package_names() {
            let Some(latest) = catalog.latest(name) else {
                continue;
            };
            if defaults.accepts(&latest.package_reference) {
                requested.insert(name, latest.version.clone());
            }
        }
    }

    if let Some(PackageRequest::Package { name, selector }) = &inputs.request {
        if !catalog.contains(name) {
            return Err(SelectionError::UnknownPackage { name: name.clone() }.into());
        }
        match selector {
            VersionSelector::Latest => {
                requested.insert(name, catalog.latest_version(name)?);
            }
            VersionSelector::All => {
                for info in catalog.versions(name) {
                    requested.insert(name, info.version.clone());
                }
            }
            VersionSelector::Exact(version) => {
                if catalog.find(name, version).is_none() {
                    return Err(SelectionError::UnknownVersion {
                        name: name.clone(),
                        version: version.to_string(),
                    }
                    .into());
                }
                requested.insert(name, version.clone());
            }
        }
    }

    info!(
        seeds = requested.len(),
        modified = inputs.modified.len(),
        scheduled = inputs.scheduled,
        "selected seed packages"
    );
    Ok(requested)
}

/// Adds every transitive downstream dependent of the requested packages,
/// each pinned to its own latest catalog version.
pub fn expand_dependents(
    catalog: &Catalog,
    dependents: &DependentsMap,
    requested: &RequestedSet,
) -> RequestedSet {
    let mut expanded = requested.clone();
    let mut visited: BTreeSet<String> = requested.names().map(str::to_string).collect();
    let mut queue: VecDeque<String> = visited.iter().cloned().collect();

    while let Some(name) = queue.pop_front() {
        for dependent in dependents.dependents_of(&name) {
            let Some(latest) = catalog.latest(dependent) else {
                warn!(package = %dependent, "dependent has no catalog entry, skipping");
                continue;
            };
            if expanded.insert(dependent, latest.version.clone()) {
                debug!(dependency = %name, reference = %latest.package_reference, "added dependent");
            }
            if visited.insert(dependent.clone()) {
                queue.push_back(dependent.clone());
            }
        }
    }

    info!(
        requested = requested.len(),
        expanded = expanded.len(),
        "expanded downstream dependents"
    );
    expanded
}
