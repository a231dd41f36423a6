use crate::meta::LockMeta;
use crate::package::{LockKey, LockedDependency, Manager};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

/// Schema version written by this crate.
pub const LOCKFILE_VERSION: u32 = 2;

#[derive(Debug, Error)]
pub enum LockError {
    #[error("duplicate package in lockfile: {0}")]
    DuplicateKey(LockKey),
    #[error("{manager} package '{key}' has no {algorithm} hash")]
    MissingHash {
        key: LockKey,
        manager: Manager,
        algorithm: &'static str,
    },
    #[error("lockfile serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A complete set of locked packages for one or more platforms.
///
/// `package` is kept in install order once it has gone through a merge or
/// reorder; nothing in this type enforces that on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lockfile {
    #[serde(default = "default_version")]
    pub version: u32,
    pub package: Vec<LockedDependency>,
    pub metadata: LockMeta,
}

fn default_version() -> u32 {
    LOCKFILE_VERSION
}

impl Lockfile {
    pub fn new(package: Vec<LockedDependency>, metadata: LockMeta) -> Self {
        Self {
            version: LOCKFILE_VERSION,
            package,
            metadata,
        }
    }

    pub fn keys(&self) -> BTreeSet<LockKey> {
        self.package.iter().map(LockedDependency::key).collect()
    }

    /// Check that every package key is unique and that conda packages carry
    /// the md5 hash their installer verifies against.
    pub fn validate(&self) -> Result<(), LockError> {
        let mut seen = BTreeSet::new();
        for dep in &self.package {
            let key = dep.key();
            if dep.manager == Manager::Conda && dep.hash.md5.is_none() {
                return Err(LockError::MissingHash {
                    key,
                    manager: dep.manager,
                    algorithm: "md5",
                });
            }
            if !seen.insert(key.clone()) {
                return Err(LockError::DuplicateKey(key));
            }
        }
        Ok(())
    }

    /// Deterministic digest of the lockfile content, package order included.
    ///
    /// Two lockfiles fingerprint equal only if they share a schema version,
    /// owned platforms (in any listing order) and channel list, and would
    /// install the same packages in the same order.
    pub fn fingerprint(&self) -> Result<String, LockError> {
        let mut hasher = blake3::Hasher::new();

        hash_field(&mut hasher, "version", &self.version.to_le_bytes());

        let mut platforms = self.metadata.platforms.clone();
        platforms.sort();
        for platform in &platforms {
            hash_field(&mut hasher, "platform", platform.as_bytes());
        }

        for channel in &self.metadata.channels {
            hash_field(&mut hasher, "channel", channel.url.as_bytes());
        }

        for dep in &self.package {
            hash_field(&mut hasher, "pkg", &serde_json::to_vec(dep)?);
        }

        Ok(hasher.finalize().to_hex().to_string())
    }
}

// Tag and length prefix keep adjacent fields from running into each other.
fn hash_field(hasher: &mut blake3::Hasher, tag: &str, value: &[u8]) {
    hasher.update(tag.as_bytes());
    hasher.update(&(value.len() as u64).to_le_bytes());
    hasher.update(value);
}
