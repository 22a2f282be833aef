use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use stablepin_core::{Catalog, PackageDescriptor, PackageVersion, RepositoryEntry};

use crate::{validate_package_name, validate_repository_name};

#[derive(Debug, Deserialize)]
struct CatalogSnapshotFile {
    #[serde(default)]
    packages: Vec<CatalogSnapshotPackage>,
}

#[derive(Debug, Deserialize)]
struct CatalogSnapshotPackage {
    name: String,
    version: PackageVersion,
}

/// Parses one repository's catalog snapshot into descriptors owned by `repository`.
pub fn parse_catalog_snapshot(repository: &str, content: &str) -> Result<Vec<PackageDescriptor>> {
    let snapshot = toml::from_str::<CatalogSnapshotFile>(content)
        .with_context(|| format!("failed parsing catalog snapshot for '{repository}'"))?;

    let mut descriptors = Vec::with_capacity(snapshot.packages.len());
    for package in snapshot.packages {
        validate_package_name(&package.name)
            .with_context(|| format!("invalid entry in catalog snapshot for '{repository}'"))?;
        descriptors.push(PackageDescriptor {
            package_name: package.name,
            version: package.version,
            source_repository_name: repository.to_string(),
        });
    }
    Ok(descriptors)
}

/// Per-repository catalog snapshots stored as `catalog/<repository>.toml`.
#[derive(Debug, Clone)]
pub struct CatalogStore {
    state_root: PathBuf,
}

impl CatalogStore {
    pub fn new(state_root: impl Into<PathBuf>) -> Self {
        Self {
            state_root: state_root.into(),
        }
    }

    pub fn catalog_dir(&self) -> PathBuf {
        self.state_root.join("catalog")
    }

    pub fn snapshot_path(&self, repository: &str) -> PathBuf {
        self.catalog_dir().join(format!("{repository}.toml"))
    }

    /// Validates `source` and stores it as the snapshot for `repository`,
    /// replacing any previous one. Returns the number of descriptors imported.
    pub fn import_snapshot(&self, repository: &str, source: &Path) -> Result<usize> {
        validate_repository_name(repository)?;

        let content = fs::read_to_string(source)
            .with_context(|| format!("failed reading catalog snapshot: {}", source.display()))?;
        let descriptors = parse_catalog_snapshot(repository, &content)
            .with_context(|| format!("invalid catalog snapshot: {}", source.display()))?;

        let dir = self.catalog_dir();
        fs::create_dir_all(&dir)
            .with_context(|| format!("failed creating catalog dir: {}", dir.display()))?;
        let path = self.snapshot_path(repository);
        fs::write(&path, content)
            .with_context(|| format!("failed writing catalog snapshot: {}", path.display()))?;

        tracing::info!(
            repository,
            packages = descriptors.len(),
            "imported catalog snapshot"
        );
        Ok(descriptors.len())
    }

    /// Builds the catalog across `repositories` in their configured order.
    /// Repositories without a snapshot contribute nothing.
    pub fn load_catalog(&self, repositories: &[RepositoryEntry]) -> Result<Catalog> {
        let mut catalog = Catalog::new();
        for repository in repositories {
            let path = self.snapshot_path(&repository.name);
            if !path.exists() {
                tracing::debug!(repository = %repository.name, "no catalog snapshot");
                continue;
            }

            let content = fs::read_to_string(&path)
                .with_context(|| format!("failed reading catalog snapshot: {}", path.display()))?;
            let descriptors = parse_catalog_snapshot(&repository.name, &content)
                .with_context(|| format!("failed loading catalog snapshot: {}", path.display()))?;
            for descriptor in descriptors {
                catalog.insert(descriptor);
            }
        }
        Ok(catalog)
    }
}
