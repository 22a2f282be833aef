use anyhow::{Context, Result};
use stablepin_core::{InstalledRegistry, PackageVersion};
use std::fs;
use std::path::PathBuf;

use crate::fs_utils::remove_file_if_exists;
use crate::{InstallReceipt, PrefixLayout};

pub fn write_install_receipt(layout: &PrefixLayout, receipt: &InstallReceipt) -> Result<PathBuf> {
    let mut payload = String::new();
    payload.push_str(&format!("name={}\n", receipt.name));
    payload.push_str(&format!("version={}\n", receipt.version));
    payload.push_str(&format!("repository={}\n", receipt.repository));
    payload.push_str(&format!(
        "installed_at_unix={}\n",
        receipt.installed_at_unix
    ));

    let dir = layout.installed_state_dir();
    fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create install state dir: {}", dir.display()))?;
    let path = layout.receipt_path(&receipt.name, &receipt.version.to_string());
    fs::write(&path, payload.as_bytes())
        .with_context(|| format!("failed to write install receipt: {}", path.display()))?;
    Ok(path)
}

pub fn read_install_receipt(
    layout: &PrefixLayout,
    name: &str,
    version: &str,
) -> Result<Option<InstallReceipt>> {
    let path = layout.receipt_path(name, version);
    if !path.exists() {
        return Ok(None);
    }

    let raw = fs::read_to_string(&path)
        .with_context(|| format!("failed to read install receipt: {}", path.display()))?;
    let receipt = parse_receipt(&raw)
        .with_context(|| format!("failed to parse install receipt: {}", path.display()))?;
    Ok(Some(receipt))
}

pub fn remove_install_receipt(layout: &PrefixLayout, name: &str, version: &str) -> Result<bool> {
    let path = layout.receipt_path(name, version);
    if !path.exists() {
        return Ok(false);
    }

    remove_file_if_exists(&path)
        .with_context(|| format!("failed to remove install receipt: {}", path.display()))?;
    Ok(true)
}

/// All receipts, ordered by package name then version.
pub fn read_install_receipts(layout: &PrefixLayout) -> Result<Vec<InstallReceipt>> {
    let dir = layout.installed_state_dir();
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut receipts = Vec::new();
    for entry in fs::read_dir(&dir)
        .with_context(|| format!("failed to read install state directory: {}", dir.display()))?
    {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }

        let path = entry.path();
        if path.extension().and_then(|v| v.to_str()) != Some("receipt") {
            continue;
        }

        let raw = fs::read_to_string(&path)
            .with_context(|| format!("failed to read install receipt: {}", path.display()))?;
        let receipt = parse_receipt(&raw)
            .with_context(|| format!("failed to parse install receipt: {}", path.display()))?;
        receipts.push(receipt);
    }

    receipts.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.version.cmp(&b.version)));
    Ok(receipts)
}

pub fn read_installed_registry(layout: &PrefixLayout) -> Result<InstalledRegistry> {
    Ok(read_install_receipts(layout)?
        .iter()
        .map(InstallReceipt::to_installed_package)
        .collect())
}

pub(crate) fn parse_receipt(raw: &str) -> Result<InstallReceipt> {
    let mut name = None;
    let mut version = None;
    let mut repository = None;
    let mut installed_at_unix = None;

    for line in raw.lines().map(str::trim).filter(|line| !line.is_empty()) {
        let Some((k, v)) = line.split_once('=') else {
            continue;
        };
        match k {
            "name" => name = Some(v.to_string()),
            "version" => {
                version = Some(
                    v.parse::<PackageVersion>()
                        .with_context(|| format!("invalid receipt version '{v}'"))?,
                )
            }
            "repository" => repository = Some(v.to_string()),
            "installed_at_unix" => {
                installed_at_unix = Some(v.parse().context("installed_at_unix must be u64")?)
            }
            _ => {}
        }
    }

    Ok(InstallReceipt {
        name: name.context("missing name")?,
        version: version.context("missing version")?,
        repository: repository.context("missing repository")?,
        installed_at_unix: installed_at_unix.context("missing installed_at_unix")?,
    })
}
