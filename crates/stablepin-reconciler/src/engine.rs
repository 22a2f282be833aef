use std::collections::{BTreeSet, HashSet};

use anyhow::Result;
use stablepin_core::{
    Catalog, ChangeRecord, InstalledPackage, InstalledRegistry, PackageDescriptor, PackageHost,
    PinEntry, RepositoryEntry,
};

use crate::{ChannelPatterns, ChannelResolver, ChannelRole, ChannelRoles, PlannedReplacement};

/// Pinning and reinstall decisions over one snapshot of host state.
///
/// The reconciler only reads the catalog and installed registry it was built
/// with. Mutations go through the [`PackageHost`] handed to [`Self::reconcile`];
/// rebuild the reconciler from fresh host state before the next run.
#[derive(Debug, Clone)]
pub struct Reconciler<'a> {
    resolver: ChannelResolver<'a>,
    patterns: ChannelPatterns,
    catalog: &'a Catalog,
    installed: &'a InstalledRegistry,
}

impl<'a> Reconciler<'a> {
    pub fn new(
        repositories: &'a [RepositoryEntry],
        catalog: &'a Catalog,
        installed: &'a InstalledRegistry,
        patterns: ChannelPatterns,
    ) -> Self {
        Self {
            resolver: ChannelResolver::new(repositories),
            patterns,
            catalog,
            installed,
        }
    }

    pub fn resolve(&self, role: ChannelRole) -> Option<&'a str> {
        let resolved = self.resolver.resolve_role(self.patterns.for_role(role));
        tracing::debug!(%role, repository = ?resolved, "resolved channel role");
        resolved
    }

    pub fn roles(&self) -> ChannelRoles {
        ChannelRoles {
            stable: self.resolve(ChannelRole::Stable).map(str::to_string),
            unstable: self.resolve(ChannelRole::Unstable).map(str::to_string),
        }
    }

    /// Pins every package offered by both the stable and the unstable
    /// repository to the stable one. Empty when either role is unconfigured.
    pub fn build_pin_list(&self) -> BTreeSet<PinEntry> {
        let (Some(stable), Some(unstable)) = (
            self.resolve(ChannelRole::Stable),
            self.resolve(ChannelRole::Unstable),
        ) else {
            tracing::warn!("stable or unstable repository not configured; nothing to pin");
            return BTreeSet::new();
        };

        let mut pins = BTreeSet::new();
        for (package_name, descriptors) in self.catalog.iter() {
            let offered_by = descriptors
                .iter()
                .map(|descriptor| descriptor.source_repository_name.as_str())
                .collect::<HashSet<_>>();
            if offered_by.contains(stable) && offered_by.contains(unstable) {
                pins.insert(PinEntry::new(package_name, stable));
            }
        }
        pins
    }

    /// Installed packages whose version looks channel-synthesized.
    ///
    /// This checks the version's shape only, not the repository a package was
    /// installed from, so a synthetic-looking version from any repository is
    /// included.
    pub fn find_unstable_installed(&self) -> Vec<&'a InstalledPackage> {
        self.installed
            .records()
            .filter(|record| record.version.is_synthetic())
            .collect()
    }

    pub fn find_in_repository(
        &self,
        package_name: &str,
        repository_name: &str,
    ) -> Option<&'a PackageDescriptor> {
        self.catalog
            .descriptors(package_name)
            .iter()
            .find(|descriptor| descriptor.source_repository_name == repository_name)
    }

    /// Replacements `reconcile` would perform, in installed-registry order.
    ///
    /// No version comparison is applied: synthetic and canonical versions are
    /// not comparable, so any stable descriptor wins.
    pub fn plan(&self) -> Vec<PlannedReplacement<'a>> {
        let Some(stable) = self.resolve(ChannelRole::Stable) else {
            tracing::warn!("stable repository not configured; nothing to reconcile");
            return Vec::new();
        };

        let mut plan = Vec::new();
        for installed in self.find_unstable_installed() {
            let Some(candidate) = self.find_in_repository(&installed.package_name, stable) else {
                tracing::debug!(
                    package = %installed.package_name,
                    version = %installed.version,
                    repository = stable,
                    "no stable descriptor; leaving installed"
                );
                continue;
            };
            plan.push(PlannedReplacement {
                installed,
                candidate,
            });
        }
        plan
    }

    /// Replaces each planned package by uninstalling it and then installing
    /// the stable descriptor. The first host failure aborts the run and is
    /// returned as-is; packages already replaced stay replaced.
    pub fn reconcile(&self, host: &mut dyn PackageHost) -> Result<Vec<ChangeRecord>> {
        let plan = self.plan();
        let mut changes = Vec::with_capacity(plan.len());
        for step in plan {
            host.uninstall(step.installed)?;
            host.install(step.candidate)?;

            let change = step.change_record();
            tracing::info!(
                package = %change.package_name,
                old = %change.old_version,
                new = %change.new_version,
                "replaced unstable package"
            );
            changes.push(change);
        }
        Ok(changes)
    }
}
