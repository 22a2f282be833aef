use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Context};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// First-component threshold above which a two-component version is treated
/// as a channel-assigned `YYYYMMDD.NNN` build stamp.
pub const SYNTHETIC_VERSION_FLOOR: u64 = 20_000_000;

/// A version as an ordered tuple of non-negative integers, written `1.4.2`.
///
/// Ordering is plain lexicographic over the components, so `(20140101, 5)`
/// sorts above `(1, 2, 0)`. Nothing in reconciliation relies on ordering
/// across version schemes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PackageVersion(Vec<u64>);

impl PackageVersion {
    pub fn new(components: impl Into<Vec<u64>>) -> Self {
        Self(components.into())
    }

    pub fn components(&self) -> &[u64] {
        &self.0
    }

    pub fn is_synthetic(&self) -> bool {
        is_synthetic_version(&self.0)
    }
}

/// Heuristic classification of channel-synthesized versions.
///
/// True only for exactly two components whose first exceeds
/// [`SYNTHETIC_VERSION_FLOOR`]. A real upstream version shaped like `30000000.1`
/// is misclassified as synthetic; that case is accepted rather than special-cased.
pub fn is_synthetic_version(components: &[u64]) -> bool {
    matches!(components, [first, _] if *first > SYNTHETIC_VERSION_FLOOR)
}

impl FromStr for PackageVersion {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(anyhow!("version must not be empty"));
        }

        let components = trimmed
            .split('.')
            .map(|part| {
                part.parse::<u64>()
                    .with_context(|| format!("invalid version component '{part}' in '{trimmed}'"))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(Self(components))
    }
}

impl fmt::Display for PackageVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, component) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(".")?;
            }
            write!(f, "{component}")?;
        }
        Ok(())
    }
}

impl Serialize for PackageVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PackageVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse()
            .map_err(|err: anyhow::Error| serde::de::Error::custom(format!("{err:#}")))
    }
}
