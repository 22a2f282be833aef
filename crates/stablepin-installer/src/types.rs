use stablepin_core::{InstalledPackage, PackageDescriptor, PackageVersion};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReceipt {
    pub name: String,
    pub version: PackageVersion,
    pub repository: String,
    pub installed_at_unix: u64,
}

impl InstallReceipt {
    pub fn for_descriptor(descriptor: &PackageDescriptor, installed_at_unix: u64) -> Self {
        Self {
            name: descriptor.package_name.clone(),
            version: descriptor.version.clone(),
            repository: descriptor.source_repository_name.clone(),
            installed_at_unix,
        }
    }

    pub fn to_installed_package(&self) -> InstalledPackage {
        InstalledPackage {
            package_name: self.name.clone(),
            version: self.version.clone(),
            source_repository_name: self.repository.clone(),
        }
    }
}
