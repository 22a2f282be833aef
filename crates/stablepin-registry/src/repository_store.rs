use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use stablepin_core::RepositoryEntry;

use crate::{
    parse_repository_state_file, validate_repository_name, validate_repository_url,
    RepositoryStateFile, RoleOverrides,
};

/// The configured repositories, in configured order, plus any role pattern overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositoryConfig {
    pub repositories: Vec<RepositoryEntry>,
    pub roles: RoleOverrides,
}

/// Reads and writes `repositories.toml` under a state root.
///
/// Unlike source priority lists, repository order here is the order entries
/// were added, and it is never re-sorted: role resolution picks the first match.
#[derive(Debug, Clone)]
pub struct RepositoryStore {
    state_root: PathBuf,
}

impl RepositoryStore {
    pub fn new(state_root: impl Into<PathBuf>) -> Self {
        Self {
            state_root: state_root.into(),
        }
    }

    pub fn add_repository(&self, repository: RepositoryEntry) -> Result<()> {
        validate_repository_name(&repository.name)?;
        validate_repository_url(&repository.url)?;

        let mut state = self.load_state()?;
        if state
            .repositories
            .iter()
            .any(|existing| existing.name == repository.name)
        {
            anyhow::bail!("repository '{}' already exists", repository.name);
        }

        tracing::debug!(name = %repository.name, url = %repository.url, "adding repository");
        state.repositories.push(repository);
        self.save_state(&state)
    }

    pub fn list_repositories(&self) -> Result<Vec<RepositoryEntry>> {
        Ok(self.load_state()?.repositories)
    }

    pub fn remove_repository(&self, name: &str) -> Result<()> {
        let mut state = self.load_state()?;
        let before = state.repositories.len();
        state.repositories.retain(|repository| repository.name != name);
        if state.repositories.len() == before {
            anyhow::bail!("repository '{}' not found", name);
        }

        self.save_state(&state)
    }

    pub fn load_config(&self) -> Result<RepositoryConfig> {
        let state = self.load_state()?;
        Ok(RepositoryConfig {
            repositories: state.repositories,
            roles: state.roles,
        })
    }

    fn repositories_file_path(&self) -> PathBuf {
        self.state_root.join("repositories.toml")
    }

    fn load_state(&self) -> Result<RepositoryStateFile> {
        let path = self.repositories_file_path();
        if !path.exists() {
            return Ok(RepositoryStateFile::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed reading repository state: {}", path.display()))?;
        parse_repository_state_file(&content)
            .with_context(|| format!("failed parsing repository state: {}", path.display()))
    }

    fn save_state(&self, state: &RepositoryStateFile) -> Result<()> {
        fs::create_dir_all(&self.state_root).with_context(|| {
            format!(
                "failed creating repository state root: {}",
                self.state_root.display()
            )
        })?;

        let path = self.repositories_file_path();
        let content = toml::to_string(state)
            .with_context(|| format!("failed serializing repository state: {}", path.display()))?;
        fs::write(&path, content)
            .with_context(|| format!("failed writing repository state: {}", path.display()))
    }
}
