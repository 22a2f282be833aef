use std::collections::BTreeMap;

use crate::{InstalledPackage, PackageDescriptor};

/// Every descriptor known to the host, grouped by package name.
///
/// Descriptors for one name keep the order they were inserted in, which is the
/// configured repository order when built by the registry crate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    packages: BTreeMap<String, Vec<PackageDescriptor>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, descriptor: PackageDescriptor) {
        self.packages
            .entry(descriptor.package_name.clone())
            .or_default()
            .push(descriptor);
    }

    pub fn descriptors(&self, package_name: &str) -> &[PackageDescriptor] {
        self.packages
            .get(package_name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[PackageDescriptor])> {
        self.packages
            .iter()
            .map(|(name, descriptors)| (name.as_str(), descriptors.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.packages.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

impl FromIterator<PackageDescriptor> for Catalog {
    fn from_iter<T: IntoIterator<Item = PackageDescriptor>>(iter: T) -> Self {
        let mut catalog = Self::new();
        for descriptor in iter {
            catalog.insert(descriptor);
        }
        catalog
    }
}

/// Locally installed packages. A name may map to several installed versions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstalledRegistry {
    packages: BTreeMap<String, Vec<InstalledPackage>>,
}

impl InstalledRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, record: InstalledPackage) {
        self.packages
            .entry(record.package_name.clone())
            .or_default()
            .push(record);
    }

    pub fn get(&self, package_name: &str) -> &[InstalledPackage] {
        self.packages
            .get(package_name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn records(&self) -> impl Iterator<Item = &InstalledPackage> {
        self.packages.values().flatten()
    }

    pub fn len(&self) -> usize {
        self.packages.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

impl FromIterator<InstalledPackage> for InstalledRegistry {
    fn from_iter<T: IntoIterator<Item = InstalledPackage>>(iter: T) -> Self {
        let mut registry = Self::new();
        for record in iter {
            registry.insert(record);
        }
        registry
    }
}
