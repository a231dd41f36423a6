use crate::options::{CyclePolicy, MergeOptions};
use crate::toposort::linearize;
use crate::CoreError;
use lockweave_schema::{LockedDependency, Lockfile, Manager, PackageName, Platform};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, trace, warn};

/// Put packages into install order with the default options.
pub fn reorder(packages: Vec<LockedDependency>) -> Result<Vec<LockedDependency>, CoreError> {
    reorder_with(packages, &MergeOptions::default())
}

/// Put packages into install order.
///
/// Platforms are emitted in sorted order. Within a platform all conda
/// packages come before all pip packages, and each manager's packages are
/// ordered so that a package follows every dependency it has in the same
/// group. Dependency edges across managers or platforms are not ordered
/// individually; the conda-before-pip grouping is what satisfies them.
/// Conda virtual packages are dropped, and the conda `python -> pip` edge is
/// ignored so the interpreter precedes pip. Pip groups keep every edge.
pub fn reorder_with(
    packages: Vec<LockedDependency>,
    options: &MergeOptions,
) -> Result<Vec<LockedDependency>, CoreError> {
    let total = packages.len();
    let mut groups: BTreeMap<(Platform, Manager), BTreeMap<PackageName, LockedDependency>> =
        BTreeMap::new();
    for dep in packages {
        let group = groups
            .entry((dep.platform.clone(), dep.manager))
            .or_default();
        if let Some(previous) = group.insert(dep.name.clone(), dep) {
            warn!(
                "package '{}' listed twice for {} on {}, keeping the later entry",
                previous.name, previous.manager, previous.platform
            );
        }
    }

    let platforms: BTreeSet<Platform> = groups
        .keys()
        .map(|(platform, _)| platform.clone())
        .collect();

    let mut ordered = Vec::with_capacity(total);
    for platform in &platforms {
        for manager in Manager::INSTALL_ORDER {
            let Some(records) = groups.remove(&(platform.clone(), manager)) else {
                continue;
            };
            order_group(platform, manager, records, options.on_cycle, &mut ordered)?;
        }
    }

    debug!(
        "ordered {} of {total} packages across {} platform(s)",
        ordered.len(),
        platforms.len()
    );
    Ok(ordered)
}

/// Reorder a lockfile's packages in place.
pub fn toposort_in_place(
    lockfile: &mut Lockfile,
    options: &MergeOptions,
) -> Result<(), CoreError> {
    let packages = std::mem::take(&mut lockfile.package);
    lockfile.package = reorder_with(packages, options)?;
    Ok(())
}

fn order_group(
    platform: &Platform,
    manager: Manager,
    mut records: BTreeMap<PackageName, LockedDependency>,
    policy: CyclePolicy,
    out: &mut Vec<LockedDependency>,
) -> Result<(), CoreError> {
    let mut graph: BTreeMap<PackageName, BTreeSet<PackageName>> = records
        .iter()
        .map(|(name, dep)| (name.clone(), dep.dependency_names()))
        .collect();

    // conda's python lists pip as a run dependency while pip needs python to
    // install. Python must come first. Only the conda group's python is the
    // interpreter; a pip record named python keeps its edges.
    if manager == Manager::Conda {
        if let Some(deps) = graph.get_mut("python") {
            deps.remove("pip");
        }
    }

    let linearization = linearize(&graph, policy).map_err(|cycle| CoreError::DependencyCycle {
        platform: platform.to_string(),
        manager,
        packages: cycle.members.iter().map(ToString::to_string).collect(),
    })?;

    for name in &linearization.broken {
        warn!("dependency cycle among {manager} packages on {platform}: placing '{name}' early");
    }

    for name in linearization.order {
        // Names without a record are dependencies satisfied elsewhere, e.g. a
        // pip package depending on a conda-provided library.
        let Some(dep) = records.remove(&name) else {
            continue;
        };
        if dep.is_virtual() {
            trace!("skipping virtual package {name} on {platform}");
            continue;
        }
        out.push(dep);
    }
    Ok(())
}
