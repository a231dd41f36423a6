//! Lockfile merging and install ordering for lockweave.
//!
//! `merge` combines a fresh solve with a previous lockfile, preferring the
//! fresh records only on the platforms the fresh solve covered. `reorder`
//! turns any package list into install order: platforms sorted, conda before
//! pip, and dependencies before dependents within each group. Both are pure
//! functions over in-memory `lockweave_schema` types.

pub mod merge;
pub mod options;
pub mod reorder;
pub mod toposort;

pub use merge::{merge, merge_with};
pub use options::{parse_options_str, CyclePolicy, MergeOptions};
pub use reorder::{reorder, reorder_with, toposort_in_place};
pub use toposort::{linearize, Cycle, Linearization};

use lockweave_schema::Manager;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("channel configuration mismatch: new solve has {ours}, previous lockfile has {theirs}")]
    ConfigMismatch { ours: String, theirs: String },
    #[error("cannot merge lockfile version {theirs} into version {ours}")]
    TypeMismatch { ours: u32, theirs: u32 },
    #[error("dependency cycle among {manager} packages on {platform}: {}", .packages.join(", "))]
    DependencyCycle {
        platform: String,
        manager: Manager,
        packages: Vec<String>,
    },
    #[error("duplicate package in merge input: {0}")]
    DuplicateKey(String),
    #[error("invalid merge options: {0}")]
    InvalidOptions(#[from] toml::de::Error),
}
