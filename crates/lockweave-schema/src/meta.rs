use crate::types::Platform;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::warn;

/// A package channel as configured when the lockfile was solved.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Channel {
    pub url: String,
    /// Environment variables referenced from `url` (credentials, tokens).
    #[serde(default)]
    pub used_env_vars: BTreeSet<String>,
}

impl Channel {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            used_env_vars: BTreeSet::new(),
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeMeta {
    pub created_at: String,
}

impl TimeMeta {
    /// Stamp the current UTC time, second precision.
    pub fn now() -> Self {
        Self {
            created_at: chrono::Utc::now()
                .format("%Y-%m-%dT%H:%M:%S")
                .to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_user_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_sha: Option<String>,
}

impl GitMeta {
    fn is_empty(&self) -> bool {
        self.git_user_name.is_none() && self.git_user_email.is_none() && self.git_sha.is_none()
    }
}

/// Digests of one environment source file that fed the solve.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub md5: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

/// Optional metadata a caller may ask to keep in a lockfile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataOption {
    #[serde(rename = "timestamp")]
    TimeStamp,
    GitSha,
    GitUserName,
    GitUserEmail,
    InputMd5,
    InputSha,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockMeta {
    /// Per-platform hash of the solver inputs.
    #[serde(default)]
    pub content_hash: BTreeMap<Platform, String>,
    pub channels: Vec<Channel>,
    /// Platforms this lockfile was solved for. Records on other platforms
    /// are carried over, not owned.
    pub platforms: Vec<Platform>,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_metadata: Option<TimeMeta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_metadata: Option<GitMeta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputs_metadata: Option<BTreeMap<String, InputMeta>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_metadata: Option<BTreeMap<String, String>>,
}

impl LockMeta {
    pub fn owns_platform(&self, platform: &Platform) -> bool {
        self.platforms.contains(platform)
    }

    /// Combine two metadata blocks. `preferred` wins wherever both sides
    /// carry a value for the same field or key.
    pub fn combine(preferred: &LockMeta, other: &LockMeta) -> LockMeta {
        let mut content_hash = other.content_hash.clone();
        content_hash.extend(
            preferred
                .content_hash
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );

        let platforms: BTreeSet<Platform> = preferred
            .platforms
            .iter()
            .chain(&other.platforms)
            .cloned()
            .collect();

        let mut sources = other.sources.clone();
        for source in &preferred.sources {
            if !sources.contains(source) {
                sources.push(source.clone());
            }
        }

        let inputs_metadata = match (&preferred.inputs_metadata, &other.inputs_metadata) {
            (None, theirs) => theirs.clone(),
            (ours, None) => ours.clone(),
            (Some(ours), Some(theirs)) => {
                let mut merged = theirs.clone();
                merged.extend(ours.iter().map(|(k, v)| (k.clone(), v.clone())));
                Some(merged)
            }
        };

        let custom_metadata = match (&preferred.custom_metadata, &other.custom_metadata) {
            (None, theirs) => theirs.clone(),
            (ours, None) => ours.clone(),
            (Some(ours), Some(theirs)) => {
                let mut merged = theirs.clone();
                for (key, value) in ours {
                    if let Some(previous) = merged.insert(key.clone(), value.clone()) {
                        if previous != *value {
                            warn!(
                                "custom metadata key '{key}' provided twice, \
                                 overwriting '{previous}' with '{value}'"
                            );
                        }
                    }
                }
                Some(merged)
            }
        };

        LockMeta {
            content_hash,
            channels: preferred.channels.clone(),
            platforms: platforms.into_iter().collect(),
            sources,
            time_metadata: preferred.time_metadata.clone(),
            git_metadata: preferred.git_metadata.clone(),
            inputs_metadata,
            custom_metadata,
        }
    }

    /// Drop the optional metadata that was not asked for.
    #[must_use]
    pub fn retain_metadata(&self, options: &BTreeSet<MetadataOption>) -> LockMeta {
        let time_metadata = if options.contains(&MetadataOption::TimeStamp) {
            self.time_metadata.clone()
        } else {
            None
        };

        let git_metadata = self.git_metadata.as_ref().and_then(|git| {
            let kept = GitMeta {
                git_user_name: git
                    .git_user_name
                    .clone()
                    .filter(|_| options.contains(&MetadataOption::GitUserName)),
                git_user_email: git
                    .git_user_email
                    .clone()
                    .filter(|_| options.contains(&MetadataOption::GitUserEmail)),
                git_sha: git
                    .git_sha
                    .clone()
                    .filter(|_| options.contains(&MetadataOption::GitSha)),
            };
            (!kept.is_empty()).then_some(kept)
        });

        let keep_md5 = options.contains(&MetadataOption::InputMd5);
        let keep_sha = options.contains(&MetadataOption::InputSha);
        let inputs_metadata = self
            .inputs_metadata
            .as_ref()
            .filter(|_| keep_md5 || keep_sha)
            .map(|inputs| {
                inputs
                    .iter()
                    .map(|(source, meta)| {
                        let kept = InputMeta {
                            md5: meta.md5.clone().filter(|_| keep_md5),
                            sha256: meta.sha256.clone().filter(|_| keep_sha),
                        };
                        (source.clone(), kept)
                    })
                    .collect()
            });

        LockMeta {
            time_metadata,
            git_metadata,
            inputs_metadata,
            ..self.clone()
        }
    }
}
