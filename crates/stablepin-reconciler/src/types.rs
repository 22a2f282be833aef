use stablepin_core::{ChangeRecord, InstalledPackage, PackageDescriptor};

/// Repository names currently bound to each role, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelRoles {
    pub stable: Option<String>,
    pub unstable: Option<String>,
}

/// One installed unstable package and the stable descriptor that will replace it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedReplacement<'a> {
    pub installed: &'a InstalledPackage,
    pub candidate: &'a PackageDescriptor,
}

impl PlannedReplacement<'_> {
    pub fn change_record(&self) -> ChangeRecord {
        ChangeRecord {
            package_name: self.installed.package_name.clone(),
            old_version: self.installed.version.clone(),
            new_version: self.candidate.version.clone(),
        }
    }
}
