use crate::types::{PackageName, Platform};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Names starting with this prefix are conda virtual packages (`__glibc`,
/// `__cuda`, ...). They describe host capabilities and are never installed.
pub const VIRTUAL_PACKAGE_PREFIX: &str = "__";

/// Returns true if `name` is reserved for a virtual package.
pub fn is_virtual_package_name(name: &str) -> bool {
    name.starts_with(VIRTUAL_PACKAGE_PREFIX)
}

/// The tool that installs a locked package.
///
/// Variant order is the install order: conda packages provide the
/// interpreter and shared libraries that pip packages build on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Manager {
    Conda,
    Pip,
}

impl Manager {
    /// Managers in the order their packages must be installed on a platform.
    pub const INSTALL_ORDER: [Manager; 2] = [Manager::Conda, Manager::Pip];

    pub fn as_str(self) -> &'static str {
        match self {
            Manager::Conda => "conda",
            Manager::Pip => "pip",
        }
    }
}

impl fmt::Display for Manager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Composite identity of a locked package within one lockfile.
///
/// Field order defines the sort order used when merging: manager, then
/// name, then platform.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LockKey {
    pub manager: Manager,
    pub name: PackageName,
    pub platform: Platform,
}

impl fmt::Display for LockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}@{}", self.manager, self.name, self.platform)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashModel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub md5: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

/// Where a package was actually fetched from when it differs from `url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DependencySource {
    Url { url: String },
}

/// A single resolved package pinned for one platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockedDependency {
    pub name: PackageName,
    pub version: String,
    pub manager: Manager,
    pub platform: Platform,
    /// Dependency name to version constraint. Only the names matter for
    /// install ordering.
    #[serde(default)]
    pub dependencies: BTreeMap<PackageName, String>,
    pub url: String,
    pub hash: HashModel,
    #[serde(default)]
    pub optional: bool,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<DependencySource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build: Option<String>,
}

fn default_category() -> String {
    "main".to_owned()
}

impl LockedDependency {
    pub fn new(
        name: impl Into<PackageName>,
        version: impl Into<String>,
        manager: Manager,
        platform: impl Into<Platform>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            manager,
            platform: platform.into(),
            dependencies: BTreeMap::new(),
            url: String::new(),
            hash: HashModel::default(),
            optional: false,
            category: default_category(),
            source: None,
            build: None,
        }
    }

    #[must_use]
    pub fn with_dependency(
        mut self,
        name: impl Into<PackageName>,
        spec: impl Into<String>,
    ) -> Self {
        self.dependencies.insert(name.into(), spec.into());
        self
    }

    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    #[must_use]
    pub fn with_md5(mut self, md5: impl Into<String>) -> Self {
        self.hash.md5 = Some(md5.into());
        self
    }

    #[must_use]
    pub fn with_sha256(mut self, sha256: impl Into<String>) -> Self {
        self.hash.sha256 = Some(sha256.into());
        self
    }

    pub fn key(&self) -> LockKey {
        LockKey {
            manager: self.manager,
            name: self.name.clone(),
            platform: self.platform.clone(),
        }
    }

    /// True for conda virtual packages. Pip has no such concept, so a pip
    /// package named `__foo` is an ordinary package.
    pub fn is_virtual(&self) -> bool {
        self.manager == Manager::Conda && is_virtual_package_name(&self.name)
    }

    pub fn dependency_names(&self) -> BTreeSet<PackageName> {
        self.dependencies.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_orders_by_manager_then_name_then_platform() {
        let mut keys = vec![
            LockedDependency::new("zlib", "1.3", Manager::Conda, "osx-64").key(),
            LockedDependency::new("attrs", "23.1", Manager::Pip, "linux-64").key(),
            LockedDependency::new("zlib", "1.3", Manager::Conda, "linux-64").key(),
            LockedDependency::new("bzip2", "1.0.8", Manager::Conda, "win-64").key(),
        ];
        keys.sort();
        let rendered: Vec<String> = keys.iter().map(ToString::to_string).collect();
        assert_eq!(
            rendered,
            vec![
                "conda:bzip2@win-64",
                "conda:zlib@linux-64",
                "conda:zlib@osx-64",
                "pip:attrs@linux-64",
            ]
        );
    }

    #[test]
    fn virtual_only_for_conda() {
        let conda = LockedDependency::new("__glibc", "2.28", Manager::Conda, "linux-64");
        let pip = LockedDependency::new("__glibc", "2.28", Manager::Pip, "linux-64");
        let plain = LockedDependency::new("glibc", "2.28", Manager::Conda, "linux-64");
        assert!(conda.is_virtual());
        assert!(!pip.is_virtual());
        assert!(!plain.is_virtual());
    }

    #[test]
    fn reserved_name_prefix() {
        assert!(is_virtual_package_name("__cuda"));
        assert!(is_virtual_package_name("__"));
        assert!(!is_virtual_package_name("_libgcc_mutex"));
        assert!(!is_virtual_package_name("numpy"));
    }

    #[test]
    fn install_order_puts_conda_first() {
        assert_eq!(Manager::INSTALL_ORDER, [Manager::Conda, Manager::Pip]);
    }

    #[test]
    fn deserializes_with_defaults() {
        let json = r#"{
            "name": "requests",
            "version": "2.31.0",
            "manager": "pip",
            "platform": "linux-64",
            "url": "https://files.pythonhosted.org/requests-2.31.0.whl",
            "hash": {"sha256": "abc"}
        }"#;
        let dep: LockedDependency = serde_json::from_str(json).unwrap();
        assert_eq!(dep.manager, Manager::Pip);
        assert_eq!(dep.category, "main");
        assert!(!dep.optional);
        assert!(dep.dependencies.is_empty());
        assert_eq!(dep.hash.sha256.as_deref(), Some("abc"));
        assert!(dep.hash.md5.is_none());
    }

    #[test]
    fn source_serializes_with_type_tag() {
        let source = DependencySource::Url {
            url: "https://mirror.example.com/pkg.conda".to_owned(),
        };
        let value = serde_json::to_value(&source).unwrap();
        assert_eq!(value["type"], "url");
        assert_eq!(value["url"], "https://mirror.example.com/pkg.conda");
    }

    #[test]
    fn dependency_names_ignore_constraints() {
        let dep = LockedDependency::new("pandas", "2.1.0", Manager::Conda, "linux-64")
            .with_dependency("numpy", ">=1.22")
            .with_dependency("python", ">=3.9,<3.13");
        let names: Vec<String> = dep
            .dependency_names()
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(names, vec!["numpy", "python"]);
    }
}
