use serde::{Deserialize, Serialize};

use crate::PackageVersion;

/// A configured repository as the host knows it. Order of entries is significant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryEntry {
    pub name: String,
    pub url: String,
}

impl RepositoryEntry {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// One installable package as offered by one repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageDescriptor {
    pub package_name: String,
    pub version: PackageVersion,
    pub source_repository_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledPackage {
    pub package_name: String,
    pub version: PackageVersion,
    pub source_repository_name: String,
}

impl From<&PackageDescriptor> for InstalledPackage {
    fn from(value: &PackageDescriptor) -> Self {
        Self {
            package_name: value.package_name.clone(),
            version: value.version.clone(),
            source_repository_name: value.source_repository_name.clone(),
        }
    }
}

/// "Resolve `package_name` against `repository_name`."
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PinEntry {
    pub package_name: String,
    pub repository_name: String,
}

impl PinEntry {
    pub fn new(package_name: impl Into<String>, repository_name: impl Into<String>) -> Self {
        Self {
            package_name: package_name.into(),
            repository_name: repository_name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub package_name: String,
    pub old_version: PackageVersion,
    pub new_version: PackageVersion,
}

impl ChangeRecord {
    pub fn summary(&self) -> String {
        format!(
            "{} {} -> {}",
            self.package_name, self.old_version, self.new_version
        )
    }
}
