use std::collections::BTreeSet;

use anyhow::Result;
use tierkit_core::{DependentsMap, SelectionError};
use tracing::{debug, info};

use crate::types::{RequestedSet, Tier};

/// Splits the requested set into build tiers.
///
/// Starting from a single tier holding everything, every package that is a
/// recorded dependent of another package in the same tier is peeled into
/// the next tier, until a tier has no internal edge. Only direct edges from
/// the dependents map are consulted.
pub fn partition_tiers(
    requested: &RequestedSet,
    dependents: &DependentsMap,
    max_tier: usize,
) -> Result<Vec<Tier>> {
    let mut tiers: Vec<Tier> = Vec::new();
    let mut current = requested.clone();

    while !current.is_empty() {
        let mut deferred: BTreeSet<String> = BTreeSet::new();
        for name in current.names() {
            for dependent in dependents.dependents_of(name) {
                if current.contains(dependent) {
                    deferred.insert(dependent.clone());
                }
            }
        }

        if deferred.len() == current.len() {
            let cycle_nodes = deferred.into_iter().collect::<Vec<_>>();
            anyhow::bail!(
                "dependency cycle detected involving: {}",
                cycle_nodes.join(", ")
            );
        }

        let mut next = Tier::new();
        for name in &deferred {
            if let Some(versions) = current.remove(name) {
                for version in versions {
                    next.insert(name, version);
                }
            }
        }

        debug!(
            tier = tiers.len(),
            packages = current.len(),
            deferred = next.len(),
            "formed tier"
        );
        tiers.push(current);
        current = next;
    }

    if tiers.len().saturating_sub(1) > max_tier {
        return Err(SelectionError::TierOverflow {
            max_tier,
            required: tiers.len(),
        }
        .into());
    }

    info!(tiers = tiers.len(), max_tier, "partitioned build tiers");
    Ok(tiers)
}
