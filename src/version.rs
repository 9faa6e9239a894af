//! Semantic version triples and minimum-version requirements.
//!
//! Only the first three dot-delimited segments of a version string take
//! part in comparison; anything after them is ignored.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::CheckError;

/// A `major.minor.patch` version.
///
/// Field order matters: the derived `Ord` compares major, then minor,
/// then patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VersionTriple {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl VersionTriple {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse a dot-delimited version string.
    ///
    /// Fails when any of the first three segments is missing or not a
    /// non-negative integer.
    pub fn parse(version: &str) -> Result<Self, CheckError> {
        let trimmed = version.trim();
        let mut parts = [0u64; 3];
        let mut segments = trimmed.split('.');

        for (index, slot) in parts.iter_mut().enumerate() {
            let segment = segments.next().unwrap_or_default();
            *slot = segment
                .parse::<u64>()
                .map_err(|_| CheckError::VersionParse {
                    version: version.to_string(),
                    message: if segment.is_empty() {
                        format!("expected 3 numeric segments, found {}", index)
                    } else {
                        format!("segment '{}' is not a number", segment)
                    },
                })?;
        }

        Ok(Self::new(parts[0], parts[1], parts[2]))
    }
}

impl fmt::Display for VersionTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for VersionTriple {
    type Err = CheckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for VersionTriple {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for VersionTriple {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Minimum acceptable version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionRequirement {
    minimum: VersionTriple,
}

impl VersionRequirement {
    pub const fn at_least(minimum: VersionTriple) -> Self {
        Self { minimum }
    }

    pub fn minimum(&self) -> VersionTriple {
        self.minimum
    }

    /// Whether `found` is at or above the minimum.
    pub fn is_satisfied_by(&self, found: &VersionTriple) -> bool {
        *found >= self.minimum
    }
}

impl Default for VersionRequirement {
    fn default() -> Self {
        Self::at_least(VersionTriple::new(9, 2, 1))
    }
}

impl fmt::Display for VersionRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ">= {}", self.minimum)
    }
}

/// Accepts `9.2.1`, `>=9.2.1` and `>= 9.2.1`.
impl FromStr for VersionRequirement {
    type Err = CheckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bare = s.trim().trim_start_matches(">=").trim_start();
        VersionTriple::parse(bare).map(Self::at_least)
    }
}

impl Serialize for VersionRequirement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for VersionRequirement {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
