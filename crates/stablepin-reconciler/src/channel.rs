use std::fmt;

use anyhow::{Context, Result};
use regex::RegexSet;
use stablepin_core::RepositoryEntry;

pub const DEFAULT_UNSTABLE_PATTERNS: &[&str] = &[
    r"https?://melpa\.milkbox\.net/packages/?",
    r"https?://melpa\.org/packages/?",
];

pub const DEFAULT_STABLE_PATTERNS: &[&str] = &[
    r"https?://melpa-stable\.milkbox\.net/packages/?",
    r"https?://stable\.melpa\.org/packages/?",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelRole {
    Stable,
    Unstable,
}

impl ChannelRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stable => "stable",
            Self::Unstable => "unstable",
        }
    }

    pub fn default_patterns(self) -> &'static [&'static str] {
        match self {
            Self::Stable => DEFAULT_STABLE_PATTERNS,
            Self::Unstable => DEFAULT_UNSTABLE_PATTERNS,
        }
    }
}

impl fmt::Display for ChannelRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// URL patterns for one role. Patterns are unanchored regular expressions,
/// so a pattern matches anywhere inside a repository URL.
#[derive(Debug, Clone)]
pub struct RolePatterns {
    set: RegexSet,
}

impl RolePatterns {
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let set = RegexSet::new(patterns).context("invalid repository url pattern")?;
        Ok(Self { set })
    }

    pub fn builtin(role: ChannelRole) -> Result<Self> {
        Self::new(role.default_patterns())
            .with_context(|| format!("invalid built-in {role} patterns"))
    }

    pub fn matches(&self, url: &str) -> bool {
        self.set.is_match(url)
    }
}

#[derive(Debug, Clone)]
pub struct ChannelPatterns {
    pub stable: RolePatterns,
    pub unstable: RolePatterns,
}

impl ChannelPatterns {
    pub fn builtin() -> Result<Self> {
        Ok(Self {
            stable: RolePatterns::builtin(ChannelRole::Stable)?,
            unstable: RolePatterns::builtin(ChannelRole::Unstable)?,
        })
    }

    /// Built-in patterns, with either role replaced wholesale when an override is given.
    pub fn with_overrides(stable: Option<&[String]>, unstable: Option<&[String]>) -> Result<Self> {
        let stable = match stable {
            Some(patterns) => {
                RolePatterns::new(patterns).context("invalid stable role override")?
            }
            None => RolePatterns::builtin(ChannelRole::Stable)?,
        };
        let unstable = match unstable {
            Some(patterns) => {
                RolePatterns::new(patterns).context("invalid unstable role override")?
            }
            None => RolePatterns::builtin(ChannelRole::Unstable)?,
        };
        Ok(Self { stable, unstable })
    }

    pub fn for_role(&self, role: ChannelRole) -> &RolePatterns {
        match role {
            ChannelRole::Stable => &self.stable,
            ChannelRole::Unstable => &self.unstable,
        }
    }
}

/// Maps configured repositories onto channel roles by URL.
#[derive(Debug, Clone, Copy)]
pub struct ChannelResolver<'a> {
    repositories: &'a [RepositoryEntry],
}

impl<'a> ChannelResolver<'a> {
    pub fn new(repositories: &'a [RepositoryEntry]) -> Self {
        Self { repositories }
    }

    /// Name of the first configured repository whose URL matches any of
    /// `patterns`. Configured order decides ties, never pattern order.
    pub fn resolve_role(&self, patterns: &RolePatterns) -> Option<&'a str> {
        self.repositories
            .iter()
            .find(|repository| patterns.matches(&repository.url))
            .map(|repository| repository.name.as_str())
    }
}
