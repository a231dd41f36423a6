//! Locked package records and lockfile metadata for lockweave.
//!
//! This crate defines the data layer: the `LockedDependency` record and its
//! composite `LockKey`, the closed `Manager` enumeration, lockfile metadata
//! (`LockMeta`) with its combine rule, `Lockfile` validation and
//! fingerprinting, and the `UpdateSpecification` passed in by callers.

pub mod lock;
pub mod meta;
pub mod package;
pub mod types;
pub mod update;

pub use lock::{LockError, Lockfile, LOCKFILE_VERSION};
pub use meta::{Channel, GitMeta, InputMeta, LockMeta, MetadataOption, TimeMeta};
pub use package::{
    is_virtual_package_name, DependencySource, HashModel, LockKey, LockedDependency, Manager,
    VIRTUAL_PACKAGE_PREFIX,
};
pub use types::{PackageName, Platform};
pub use update::UpdateSpecification;
