use std::fs;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use stablepin_core::{
    HostFailure, InstalledPackage, PackageDescriptor, PackageHost, PinEntry, PinStore,
};

use crate::fs_utils::{remove_dir_all_if_exists, remove_dir_if_empty};
use crate::{
    append_pins, read_install_receipt, remove_install_receipt, write_install_receipt,
    InstallReceipt, PrefixLayout,
};

/// Filesystem-backed host: receipts under `state/installed`, package
/// directories under `pkgs/<name>/<version>`, pins in `state/pins`.
#[derive(Debug, Clone)]
pub struct PrefixHost {
    layout: PrefixLayout,
}

impl PrefixHost {
    pub fn new(layout: PrefixLayout) -> Self {
        Self { layout }
    }

    fn remove_installed(&self, record: &InstalledPackage) -> Result<()> {
        let version = record.version.to_string();
        let Some(receipt) = read_install_receipt(&self.layout, &record.package_name, &version)?
        else {
            anyhow::bail!("package is not installed");
        };
        if receipt.repository != record.source_repository_name {
            anyhow::bail!(
                "installed copy came from '{}', not '{}'",
                receipt.repository,
                record.source_repository_name
            );
        }

        let package_dir = self.layout.package_dir(&record.package_name, &version);
        remove_dir_all_if_exists(&package_dir).with_context(|| {
            format!("failed to remove package dir: {}", package_dir.display())
        })?;
        if let Some(parent) = package_dir.parent() {
            remove_dir_if_empty(parent)
                .with_context(|| format!("failed to prune package dir: {}", parent.display()))?;
        }
        remove_install_receipt(&self.layout, &record.package_name, &version)?;
        Ok(())
    }

    /// Installing a version whose receipt already names the same repository
    /// is a no-op, so several replaced records can share one stable copy.
    fn write_installed(&self, descriptor: &PackageDescriptor) -> Result<()> {
        let version = descriptor.version.to_string();
        if let Some(existing) =
            read_install_receipt(&self.layout, &descriptor.package_name, &version)?
        {
            if existing.repository != descriptor.source_repository_name {
                anyhow::bail!(
                    "version is already installed from '{}'",
                    existing.repository
                );
            }
            tracing::debug!(
                package = %descriptor.package_name,
                version = %descriptor.version,
                "already installed from the same repository"
            );
            return Ok(());
        }

        let package_dir = self.layout.package_dir(&descriptor.package_name, &version);
        fs::create_dir_all(&package_dir).with_context(|| {
            format!("failed to create package dir: {}", package_dir.display())
        })?;
        let receipt = InstallReceipt::for_descriptor(descriptor, current_unix_timestamp()?);
        write_install_receipt(&self.layout, &receipt)?;
        Ok(())
    }
}

impl PackageHost for PrefixHost {
    fn uninstall(&mut self, record: &InstalledPackage) -> Result<()> {
        self.remove_installed(record).map_err(|err| {
            HostFailure::Uninstall {
                name: record.package_name.clone(),
                version: record.version.to_string(),
                reason: format!("{err:#}"),
            }
        })?;
        tracing::debug!(package = %record.package_name, version = %record.version, "uninstalled");
        Ok(())
    }

    fn install(&mut self, descriptor: &PackageDescriptor) -> Result<()> {
        self.write_installed(descriptor).map_err(|err| {
            HostFailure::Install {
                name: descriptor.package_name.clone(),
                version: descriptor.version.to_string(),
                repository: descriptor.source_repository_name.clone(),
                reason: format!("{err:#}"),
            }
        })?;
        tracing::debug!(
            package = %descriptor.package_name,
            version = %descriptor.version,
            repository = %descriptor.source_repository_name,
            "installed"
        );
        Ok(())
    }
}

impl PinStore for PrefixHost {
    fn append_pins(&mut self, pins: &[PinEntry]) -> Result<usize> {
        append_pins(&self.layout, pins)
    }
}

fn current_unix_timestamp() -> Result<u64> {
    Ok(SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("system clock is before unix epoch")?
        .as_secs())
}
