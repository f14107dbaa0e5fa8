//! Release identification and discovery
//!
//! A release is one published version of the wrapped NuGet client library. Releases
//! fall into two API generations that cannot interoperate:
//!
//! - legacy (major < 3): the single `NuGet.Core` package
//! - modern (major >= 3): `NuGet.Frameworks` plus `NuGet.Versioning`
//!
//! # Modules
//!
//! - [`resolver`]: Determines which releases are usable, newest first
//! - [`store`]: Local package folder (downloaded versions, artifact locations)
//! - [`feed`]: Remote flat-container feed listing published versions

pub mod feed;
pub mod resolver;
pub mod store;

use std::fmt;
use std::str::FromStr;

use semver::Version;
use serde::{Serialize, Serializer};

use crate::config::{LEGACY_PACKAGE_IDS, MODERN_PACKAGE_IDS};

/// Semantic version naming one concrete release; cache key for isolation contexts
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReleaseId(Version);

impl ReleaseId {
    pub fn new(version: Version) -> Self {
        Self(version)
    }

    /// Parse a release identifier, padding partial versions ("4" -> 4.0.0, "4.3" -> 4.3.0)
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        let parts: Vec<&str> = input.split('.').collect();
        let normalized = match parts.len() {
            1 => format!("{}.0.0", parts[0]),
            2 => format!("{}.{}.0", parts[0], parts[1]),
            _ => input.to_string(),
        };
        Version::parse(&normalized).ok().map(Self)
    }

    pub fn version(&self) -> &Version {
        &self.0
    }

    pub fn major(&self) -> u64 {
        self.0.major
    }

    pub fn group(&self) -> ReleaseGroup {
        ReleaseGroup::of(self)
    }

    /// True when this release is at least `major.minor.patch`
    pub fn at_least(&self, major: u64, minor: u64, patch: u64) -> bool {
        (self.0.major, self.0.minor, self.0.patch) >= (major, minor, patch)
    }
}

impl fmt::Display for ReleaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for ReleaseId {
    type Err = semver::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Version::parse(s.trim()).map(Self)
    }
}

impl Serialize for ReleaseId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

/// API generation of a release; selects the binding strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReleaseGroup {
    Legacy,
    Modern,
}

impl ReleaseGroup {
    pub fn of(release: &ReleaseId) -> Self {
        if release.major() >= 3 {
            ReleaseGroup::Modern
        } else {
            ReleaseGroup::Legacy
        }
    }

    /// Packages that must all be present for a release of this group to load
    pub fn package_ids(&self) -> &'static [&'static str] {
        match self {
            ReleaseGroup::Legacy => LEGACY_PACKAGE_IDS,
            ReleaseGroup::Modern => MODERN_PACKAGE_IDS,
        }
    }

    pub fn contains(&self, release: &ReleaseId) -> bool {
        ReleaseGroup::of(release) == *self
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReleaseGroup::Legacy => "legacy",
            ReleaseGroup::Modern => "modern",
        }
    }

    pub fn all() -> [ReleaseGroup; 2] {
        [ReleaseGroup::Legacy, ReleaseGroup::Modern]
    }
}
