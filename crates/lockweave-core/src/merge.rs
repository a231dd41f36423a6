use crate::options::MergeOptions;
use crate::reorder::reorder_with;
use crate::CoreError;
use lockweave_schema::{LockKey, LockMeta, LockedDependency, Lockfile};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

/// Merge a freshly solved lockfile into a previous one, default options.
pub fn merge(ours: &Lockfile, theirs: Option<&Lockfile>) -> Result<Lockfile, CoreError> {
    merge_with(ours, theirs, &MergeOptions::default())
}

/// Merge `ours` (the new solve) into `theirs` (the previous lockfile).
///
/// For every package key present on either side, `ours` wins if it has the
/// key and owns the key's platform; otherwise the record from `theirs` is
/// kept. This lets a partial re-solve replace only the platforms it covered.
/// The result is in install order and its metadata is `ours` combined over
/// `theirs`.
///
/// With no previous lockfile the result is `ours`, reordered.
pub fn merge_with(
    ours: &Lockfile,
    theirs: Option<&Lockfile>,
    options: &MergeOptions,
) -> Result<Lockfile, CoreError> {
    let Some(theirs) = theirs else {
        debug!("no previous lockfile, reordering {} packages", ours.package.len());
        return Ok(Lockfile {
            version: ours.version,
            package: reorder_with(ours.package.clone(), options)?,
            metadata: ours.metadata.clone(),
        });
    };

    if ours.version != theirs.version {
        return Err(CoreError::TypeMismatch {
            ours: ours.version,
            theirs: theirs.version,
        });
    }

    if ours.metadata.channels != theirs.metadata.channels {
        return Err(CoreError::ConfigMismatch {
            ours: render_channels(&ours.metadata),
            theirs: render_channels(&theirs.metadata),
        });
    }

    let our_index = index_by_key(&ours.package)?;
    let their_index = index_by_key(&theirs.package)?;
    let keys: BTreeSet<&LockKey> = our_index.keys().chain(their_index.keys()).collect();

    let mut taken_from_ours = 0usize;
    let mut package = Vec::with_capacity(keys.len());
    for key in keys {
        let our_dep = our_index
            .get(key)
            .filter(|_| ours.metadata.owns_platform(&key.platform));
        // `ours` may carry a record for a platform it does not own; if
        // `theirs` has nothing for that key, it is kept rather than lost.
        let chosen = match (our_dep, their_index.get(key)) {
            (Some(dep), _) => {
                taken_from_ours += 1;
                *dep
            }
            (None, Some(dep)) => *dep,
            (None, None) => our_index[key],
        };
        package.push(chosen.clone());
    }

    info!(
        "merged {} packages ({taken_from_ours} from the new solve) for platforms [{}]",
        package.len(),
        ours.metadata
            .platforms
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    );

    Ok(Lockfile {
        version: ours.version,
        package: reorder_with(package, options)?,
        metadata: LockMeta::combine(&ours.metadata, &theirs.metadata),
    })
}

fn index_by_key(
    packages: &[LockedDependency],
) -> Result<BTreeMap<LockKey, &LockedDependency>, CoreError> {
    let mut index = BTreeMap::new();
    for dep in packages {
        let key = dep.key();
        if index.contains_key(&key) {
            return Err(CoreError::DuplicateKey(key.to_string()));
        }
        index.insert(key, dep);
    }
    Ok(index)
}

fn render_channels(meta: &LockMeta) -> String {
    let urls: Vec<String> = meta.channels.iter().map(ToString::to_string).collect();
    format!("[{}]", urls.join(", "))
}
