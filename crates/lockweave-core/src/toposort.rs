//! Deterministic linearization of a dependency graph.
//!
//! The graph maps each node to the set of nodes it depends on. Nodes are
//! placed level by level: every node whose dependencies are all placed goes
//! into the next level, and a level is emitted in ascending node order. The
//! result is a function of the graph alone, never of insertion order.

use crate::options::CyclePolicy;
use std::collections::{BTreeMap, BTreeSet};

/// Outcome of a successful linearization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Linearization<K> {
    /// Every node of the graph, dependencies before dependents.
    pub order: Vec<K>,
    /// Nodes placed ahead of some of their dependencies to break a cycle,
    /// in the order they were placed. Empty for an acyclic graph.
    pub broken: Vec<K>,
}

/// The nodes that could not be placed under [`CyclePolicy::Fail`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cycle<K> {
    pub members: Vec<K>,
}

/// Order `graph` so that every node comes after the nodes it depends on.
///
/// Dependencies that are not keys of `graph` are treated as leaf nodes and
/// appear in the output. Self edges are ignored. When no node is ready, only
/// nodes that lie on a cycle, or between cycles, are candidates to break it
/// or are reported for it; packages that merely depend on a cycle wait for it.
pub fn linearize<K: Ord + Clone>(
    graph: &BTreeMap<K, BTreeSet<K>>,
    policy: CyclePolicy,
) -> Result<Linearization<K>, Cycle<K>> {
    // Unplaced nodes and how many of their dependencies are still unplaced.
    let mut pending: BTreeMap<K, usize> = BTreeMap::new();
    let mut dependents: BTreeMap<K, Vec<K>> = BTreeMap::new();

    for (node, deps) in graph {
        let mut count = 0;
        for dep in deps.iter().filter(|dep| *dep != node) {
            pending.entry(dep.clone()).or_insert(0);
            dependents.entry(dep.clone()).or_default().push(node.clone());
            count += 1;
        }
        *pending.entry(node.clone()).or_insert(0) += count;
    }

    let mut order = Vec::with_capacity(pending.len());
    let mut broken = Vec::new();
    let mut ready: BTreeSet<K> = pending
        .iter()
        .filter(|(_, count)| **count == 0)
        .map(|(node, _)| node.clone())
        .collect();

    loop {
        if ready.is_empty() {
            if pending.is_empty() {
                break;
            }
            let members = cycle_members(&pending, &dependents);
            match policy {
                CyclePolicy::Fail => {
                    return Err(Cycle {
                        members: members.into_iter().collect(),
                    });
                }
                CyclePolicy::Break => {
                    let victim = members
                        .into_iter()
                        .min_by(|a, b| (pending[a], a).cmp(&(pending[b], b)));
                    if let Some(victim) = victim {
                        broken.push(victim.clone());
                        ready.insert(victim);
                    }
                }
            }
        }

        let level = std::mem::take(&mut ready);
        for node in &level {
            pending.remove(node);
        }
        for node in level {
            if let Some(children) = dependents.get(&node) {
                for child in children {
                    if let Some(count) = pending.get_mut(child) {
                        *count -= 1;
                        if *count == 0 {
                            ready.insert(child.clone());
                        }
                    }
                }
            }
            order.push(node);
        }
    }

    Ok(Linearization { order, broken })
}

/// Narrow a stuck pending set down to the nodes on or between cycles.
///
/// A pending node that no other pending node depends on only waits on a
/// cycle; it is peeled off, repeatedly, until every remaining node has a
/// remaining dependent.
fn cycle_members<K: Ord + Clone>(
    pending: &BTreeMap<K, usize>,
    dependents: &BTreeMap<K, Vec<K>>,
) -> BTreeSet<K> {
    let mut members: BTreeSet<K> = pending.keys().cloned().collect();
    loop {
        let downstream: Vec<K> = members
            .iter()
            .filter(|node| {
                !dependents
                    .get(*node)
                    .is_some_and(|children| children.iter().any(|c| members.contains(c)))
            })
            .cloned()
            .collect();
        if downstream.is_empty() {
            return members;
        }
        for node in &downstream {
            members.remove(node);
        }
    }
}
