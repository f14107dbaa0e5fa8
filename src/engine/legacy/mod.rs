//! `NuGet.Core` (2.x)
//!
//! The whole generation ships in one assembly and its API shape barely moved
//! between point releases, so it is published as a single typed entry point
//! rather than a table of loose members.

pub mod framework;
pub mod version;

use std::cmp::Ordering;

pub use framework::FrameworkName;
pub use version::{SemanticVersion, VersionSpec};

use crate::engine::{EngineError, Export, export};
use crate::release::ReleaseId;

pub const CORE_ASSEMBLY: &str = "NuGet.Core";

/// Name the [`CoreApi`] entry point is exported under
pub const VERSION_UTILITY: &str = "VersionUtility";

/// `VersionUtility` as shipped by one legacy release
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoreApi {
    netstandard: bool,
}

impl CoreApi {
    pub fn for_release(release: &ReleaseId) -> Self {
        Self {
            netstandard: release.at_least(2, 12, 0),
        }
    }

    /// Whether this release knows `.NETStandard`
    pub fn supports_net_standard(&self) -> bool {
        self.netstandard
    }

    pub fn parse_framework(&self, input: &str) -> Result<FrameworkName, EngineError> {
        framework::parse(input, self.netstandard)
    }

    pub fn short_framework_name(&self, framework: &FrameworkName) -> String {
        framework::short_name(framework)
    }

    pub fn is_compatible(&self, project: &FrameworkName, package: &FrameworkName) -> bool {
        framework::is_compatible(project, package, self.netstandard)
    }

    pub fn get_nearest(
        &self,
        project: &FrameworkName,
        candidates: &[FrameworkName],
    ) -> Option<FrameworkName> {
        framework::get_nearest(project, candidates, self.netstandard)
    }

    pub fn known_frameworks(&self) -> Vec<FrameworkName> {
        framework::known_frameworks(self.netstandard)
    }

    pub fn parse_version(&self, input: &str) -> Result<SemanticVersion, EngineError> {
        SemanticVersion::parse(input)
    }

    pub fn compare(&self, a: &SemanticVersion, b: &SemanticVersion) -> Ordering {
        version::compare(a, b)
    }

    pub fn parse_version_spec(&self, input: &str) -> Result<VersionSpec, EngineError> {
        VersionSpec::parse(input)
    }

    pub fn satisfies(&self, spec: &VersionSpec, version: &SemanticVersion) -> bool {
        spec.satisfies(version)
    }

    pub fn pretty_print(&self, spec: &VersionSpec) -> String {
        spec.pretty_print()
    }
}

/// Members of `assembly` as shipped in `release`; None for an assembly this
/// generation does not contain
pub fn exports(assembly: &str, release: &ReleaseId) -> Option<Vec<Export>> {
    if assembly != CORE_ASSEMBLY {
        return None;
    }
    Some(vec![export(VERSION_UTILITY, CoreApi::for_release(release))])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(release: &str) -> CoreApi {
        CoreApi::for_release(&ReleaseId::parse(release).unwrap())
    }

    #[test]
    fn net_standard_starts_at_2_12() {
        let before = api("2.11.1").parse_framework("netstandard1.0").unwrap();
        let after = api("2.12.0").parse_framework("netstandard1.0").unwrap();

        assert_ne!(before.identifier(), framework::NET_STANDARD);
        assert_eq!(after.identifier(), framework::NET_STANDARD);
    }

    #[test]
    fn exports_one_typed_entry_point() {
        let exported = exports(CORE_ASSEMBLY, &ReleaseId::parse("2.14.0").unwrap()).unwrap();

        assert_eq!(exported.len(), 1);
        let (name, member) = &exported[0];
        assert_eq!(*name, VERSION_UTILITY);
        assert!(member.downcast_ref::<CoreApi>().unwrap().supports_net_standard());
    }

    #[test]
    fn modern_assemblies_are_not_exported() {
        assert!(exports("NuGet.Versioning", &ReleaseId::parse("2.14.0").unwrap()).is_none());
    }
}
