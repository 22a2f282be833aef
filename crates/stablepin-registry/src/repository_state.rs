use std::collections::HashSet;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use stablepin_core::RepositoryEntry;

/// Optional replacements for the built-in role URL patterns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stable: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unstable: Option<Vec<String>>,
}

impl RoleOverrides {
    fn is_empty(&self) -> bool {
        self.stable.is_none() && self.unstable.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct RepositoryStateFile {
    #[serde(default = "state_file_version")]
    pub(crate) version: u32,
    #[serde(default)]
    pub(crate) repositories: Vec<RepositoryEntry>,
    #[serde(default, skip_serializing_if = "RoleOverrides::is_empty")]
    pub(crate) roles: RoleOverrides,
}

impl Default for RepositoryStateFile {
    fn default() -> Self {
        Self {
            version: state_file_version(),
            repositories: Vec::new(),
            roles: RoleOverrides::default(),
        }
    }
}

pub(crate) fn parse_repository_state_file(content: &str) -> Result<RepositoryStateFile> {
    let mut state = toml::from_str::<RepositoryStateFile>(content)
        .context("failed parsing repository state")?;
    let expected = state_file_version();
    if state.version != expected {
        anyhow::bail!(
            "unsupported repository state version {} (expected {}): update repositories.toml to version {}",
            state.version,
            expected,
            expected
        );
    }

    validate_loaded_repositories(&state.repositories)?;
    state.version = expected;
    Ok(state)
}

pub(crate) fn state_file_version() -> u32 {
    1
}

pub(crate) fn validate_repository_name(name: &str) -> Result<()> {
    if name.is_empty() || name.len() > 64 {
        anyhow::bail!("invalid repository name: must be 1 to 64 characters");
    }

    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        anyhow::bail!("invalid repository name: '{name}'");
    };

    let first_is_valid = first.is_ascii_lowercase() || first.is_ascii_digit();
    let rest_is_valid =
        chars.all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-' || ch == '_');
    if !first_is_valid || !rest_is_valid {
        anyhow::bail!("invalid repository name: '{name}'");
    }

    Ok(())
}

/// Package names become path segments under `pkgs/` and `state/installed`
/// and the left side of `name=repository` pin lines.
pub(crate) fn validate_package_name(name: &str) -> Result<()> {
    if name.is_empty() {
        anyhow::bail!("invalid package name: must not be empty");
    }
    if name == "." || name.contains("..") {
        anyhow::bail!("invalid package name: '{name}' contains a relative path component");
    }
    if let Some(ch) = name
        .chars()
        .find(|&ch| matches!(ch, '/' | '\\' | '=') || ch.is_whitespace() || ch.is_control())
    {
        anyhow::bail!("invalid package name: '{}' contains {:?}", name.escape_debug(), ch);
    }

    Ok(())
}

pub(crate) fn validate_repository_url(url: &str) -> Result<()> {
    if url.trim().is_empty() {
        anyhow::bail!("invalid repository url: must not be empty");
    }
    if url.chars().any(char::is_whitespace) {
        anyhow::bail!("invalid repository url: '{url}' contains whitespace");
    }

    Ok(())
}

pub(crate) fn validate_loaded_repositories(repositories: &[RepositoryEntry]) -> Result<()> {
    let mut seen_names: HashSet<&str> = HashSet::with_capacity(repositories.len());
    for repository in repositories {
        validate_repository_name(&repository.name)?;
        validate_repository_url(&repository.url)?;

        if !seen_names.insert(repository.name.as_str()) {
            anyhow::bail!(
                "duplicate repository name '{}' in repositories.toml: remove or rename one entry",
                repository.name
            );
        }
    }

    Ok(())
}
