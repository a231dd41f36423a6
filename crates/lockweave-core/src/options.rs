use crate::CoreError;
use serde::{Deserialize, Serialize};

/// What to do when a platform+manager group's dependency graph has a cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CyclePolicy {
    /// Place the stuck node with the fewest unplaced dependencies (ties by
    /// name), log a warning, and keep going.
    #[default]
    Break,
    /// Refuse to order the group and return `CoreError::DependencyCycle`.
    Fail,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MergeOptions {
    #[serde(default)]
    pub on_cycle: CyclePolicy,
}

impl MergeOptions {
    #[must_use]
    pub fn with_cycle_policy(mut self, policy: CyclePolicy) -> Self {
        self.on_cycle = policy;
        self
    }
}

/// Parse options from TOML text, e.g. `on_cycle = "fail"`.
pub fn parse_options_str(input: &str) -> Result<MergeOptions, CoreError> {
    Ok(toml::from_str(input)?)
}
