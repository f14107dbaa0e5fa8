//! Framework compatibility provider and expander
//!
//! A project framework can consume a package framework when the package framework
//! has the same identifier and profile and a version no higher than the project's,
//! either directly or through one of the frameworks the project expands to.
//! Expansion follows equivalent frameworks, equivalent profiles and the one-way
//! compatibility mappings (e.g. `net461` also consumes `netstandard2.0`).

use std::collections::VecDeque;

use crate::engine::DottedVersion;
use crate::engine::modern::framework::{self, NuGetFramework, identifiers as ids};
use crate::engine::modern::portable;

struct Spec {
    framework: &'static str,
    version: DottedVersion,
    profile: &'static str,
}

impl Spec {
    const fn new(framework: &'static str, version: DottedVersion, profile: &'static str) -> Self {
        Self {
            framework,
            version,
            profile,
        }
    }

    fn matches(&self, framework: &NuGetFramework) -> bool {
        framework.identifier_is(self.framework)
            && framework.version() == self.version
            && framework.profile().eq_ignore_ascii_case(self.profile)
    }

    fn to_framework(&self) -> NuGetFramework {
        NuGetFramework::with_profile(self.framework, self.version, self.profile)
    }
}

/// Two frameworks that can each consume the other's packages
const EQUIVALENT_FRAMEWORKS: &[(Spec, Spec)] = &[
    (Spec::new(ids::WINDOWS, v(8, 0), ""), Spec::new(ids::NET_CORE, v(4, 5), "")),
    (Spec::new(ids::WINDOWS, v(8, 1), ""), Spec::new(ids::NET_CORE, v3(4, 5, 1), "")),
    (Spec::new(ids::WINDOWS_PHONE, v(7, 0), ""), Spec::new(ids::SILVERLIGHT, v(3, 0), "WindowsPhone")),
    (Spec::new(ids::WINDOWS_PHONE, v(7, 1), ""), Spec::new(ids::SILVERLIGHT, v(4, 0), "WindowsPhone71")),
    (Spec::new(ids::WINDOWS_PHONE, v(8, 0), ""), Spec::new(ids::SILVERLIGHT, v(8, 0), "WindowsPhone")),
    (Spec::new(ids::WINDOWS_PHONE, v(8, 1), ""), Spec::new(ids::SILVERLIGHT, v(8, 1), "WindowsPhone")),
];

/// (identifier, profile, profile) pairs that are interchangeable
const EQUIVALENT_PROFILES: &[(&str, &str, &str)] = &[
    (ids::NET_FRAMEWORK, "Client", ""),
    (ids::NET_FRAMEWORK, "Full", ""),
];

pub struct OneWayMapping {
    pub target: &'static str,
    pub target_min: DottedVersion,
    pub target_max: DottedVersion,
    pub supported: &'static str,
    pub supported_version: DottedVersion,
}

const fn one_way(
    target: &'static str,
    target_min: DottedVersion,
    supported: &'static str,
    supported_version: DottedVersion,
) -> OneWayMapping {
    OneWayMapping {
        target,
        target_min,
        target_max: DottedVersion::MAX,
        supported,
        supported_version,
    }
}

const fn v(major: u32, minor: u32) -> DottedVersion {
    DottedVersion::of(major, minor)
}

const fn v3(major: u32, minor: u32, build: u32) -> DottedVersion {
    DottedVersion::new(major, minor, build, 0)
}

/// Frameworks in `[target_min, target_max]` can consume `supported`
pub const ONE_WAY_MAPPINGS: &[OneWayMapping] = &[
    one_way(ids::NET_FRAMEWORK, v(4, 5), ids::NET_STANDARD, v(1, 1)),
    one_way(ids::NET_FRAMEWORK, v3(4, 5, 1), ids::NET_STANDARD, v(1, 2)),
    one_way(ids::NET_FRAMEWORK, v(4, 6), ids::NET_STANDARD, v(1, 3)),
    one_way(ids::NET_FRAMEWORK, v3(4, 6, 1), ids::NET_STANDARD, v(2, 0)),
    one_way(ids::NET_CORE, v(4, 5), ids::NET_STANDARD, v(1, 1)),
    one_way(ids::NET_CORE, v3(4, 5, 1), ids::NET_STANDARD, v(1, 2)),
    one_way(ids::NET_CORE, v(5, 0), ids::NET_STANDARD, v(1, 4)),
    one_way(ids::NET_CORE, v(5, 0), ids::WINDOWS, v(8, 1)),
    one_way(ids::NET_CORE, v(5, 0), ids::WINDOWS_PHONE_APP, v(8, 1)),
    one_way(ids::WINDOWS, v(8, 0), ids::NET_STANDARD, v(1, 1)),
    one_way(ids::WINDOWS, v(8, 1), ids::NET_STANDARD, v(1, 2)),
    one_way(ids::WINDOWS_PHONE, v(8, 0), ids::NET_STANDARD, v(1, 0)),
    one_way(ids::WINDOWS_PHONE_APP, v(8, 1), ids::NET_STANDARD, v(1, 2)),
    one_way(ids::UAP, v(10, 0), ids::NET_STANDARD, v(1, 4)),
    one_way(ids::UAP, v3(10, 0, 15064), ids::NET_STANDARD, v(2, 0)),
    one_way(ids::UAP, v(10, 0), ids::WINDOWS, v(8, 1)),
    one_way(ids::UAP, v(10, 0), ids::WINDOWS_PHONE_APP, v(8, 1)),
    one_way(ids::UAP, v(10, 0), ids::NET_CORE, v(5, 0)),
    one_way(ids::NET_CORE_APP, v(1, 0), ids::NET_STANDARD, v(1, 6)),
    one_way(ids::NET_CORE_APP, v(2, 0), ids::NET_STANDARD, v(2, 0)),
    one_way(ids::NET_CORE_APP, v(3, 0), ids::NET_STANDARD, v(2, 1)),
    one_way(ids::MONO_ANDROID, v(0, 0), ids::NET_STANDARD, v(2, 0)),
    one_way(ids::MONO_TOUCH, v(0, 0), ids::NET_STANDARD, v(2, 0)),
    one_way(ids::MONO_MAC, v(0, 0), ids::NET_STANDARD, v(2, 0)),
    one_way(ids::XAMARIN_IOS, v(0, 0), ids::NET_STANDARD, v(2, 0)),
    one_way(ids::XAMARIN_MAC, v(0, 0), ids::NET_STANDARD, v(2, 0)),
    one_way(ids::XAMARIN_TVOS, v(0, 0), ids::NET_STANDARD, v(2, 0)),
    one_way(ids::XAMARIN_WATCHOS, v(0, 0), ids::NET_STANDARD, v(2, 0)),
    one_way(ids::TIZEN, v(3, 0), ids::NET_STANDARD, v(1, 6)),
    one_way(ids::TIZEN, v(4, 0), ids::NET_STANDARD, v(2, 0)),
];

const COMMON_FOLDERS: &[&str] = &[
    "net11", "net20", "net35", "net40", "net403", "net45", "net451", "net452", "net46",
    "net461", "net462", "net47", "net471", "net472", "net48", "netcore45", "netcore451",
    "netcore50", "win8", "win81", "wp7", "wp75", "wp8", "wp81", "wpa81", "sl4", "sl5",
    "uap10.0", "netstandard1.0", "netstandard1.1", "netstandard1.2", "netstandard1.3",
    "netstandard1.4", "netstandard1.5", "netstandard1.6", "netstandard2.0",
    "netstandard2.1", "netcoreapp1.0", "netcoreapp1.1", "netcoreapp2.0", "netcoreapp2.1",
    "netcoreapp2.2", "netcoreapp3.0", "netcoreapp3.1", "tizen3", "tizen4", "monoandroid",
    "monotouch", "xamarinios", "xamarinmac", "native",
];

const NET5_ERA_FOLDERS: &[&str] = &["net5.0", "net6.0", "net7.0", "net8.0"];

/// Well-known frameworks without `net5.0+` entries
pub fn common_frameworks() -> Vec<NuGetFramework> {
    COMMON_FOLDERS
        .iter()
        .filter_map(|folder| framework::parse(folder).ok())
        .collect()
}

/// Well-known frameworks including the `net5.0+` era
pub fn common_frameworks_with_net5() -> Vec<NuGetFramework> {
    COMMON_FOLDERS
        .iter()
        .chain(NET5_ERA_FOLDERS)
        .filter_map(|folder| framework::parse_with_platforms(folder).ok())
        .collect()
}

/// Every framework named by the equivalence and one-way mapping tables,
/// including the unbounded upper ends of mapping ranges
pub fn mapping_frameworks() -> Vec<NuGetFramework> {
    let mut frameworks = Vec::new();
    for (a, b) in EQUIVALENT_FRAMEWORKS {
        frameworks.push(a.to_framework());
        frameworks.push(b.to_framework());
    }
    for mapping in ONE_WAY_MAPPINGS {
        frameworks.push(NuGetFramework::new(mapping.target, mapping.target_min));
        frameworks.push(NuGetFramework::new(mapping.target, mapping.target_max));
        frameworks.push(NuGetFramework::new(mapping.supported, mapping.supported_version));
    }
    frameworks
}

/// Every portable profile plus the frameworks each one targets
pub fn portable_profile_frameworks() -> Vec<NuGetFramework> {
    let mut frameworks = Vec::new();
    for profile in portable::PROFILES {
        let pcl = NuGetFramework::with_profile(
            ids::PORTABLE,
            profile.version,
            &format!("Profile{}", profile.number),
        );
        frameworks.extend(pcl.portable_frameworks());
        frameworks.push(pcl);
    }
    frameworks
}

fn expand_once(framework: &NuGetFramework) -> Vec<NuGetFramework> {
    let mut next = Vec::new();

    for (a, b) in EQUIVALENT_FRAMEWORKS {
        if a.matches(framework) {
            next.push(b.to_framework());
        }
        if b.matches(framework) {
            next.push(a.to_framework());
        }
    }

    for (identifier, first, second) in EQUIVALENT_PROFILES {
        if !framework.identifier_is(identifier) {
            continue;
        }
        if framework.profile().eq_ignore_ascii_case(first) {
            next.push(NuGetFramework::with_profile(identifier, framework.version(), second));
        }
        if framework.profile().eq_ignore_ascii_case(second) {
            next.push(NuGetFramework::with_profile(identifier, framework.version(), first));
        }
    }

    for mapping in ONE_WAY_MAPPINGS {
        if framework.identifier_is(mapping.target)
            && framework.version() >= mapping.target_min
            && framework.version() <= mapping.target_max
        {
            next.push(NuGetFramework::new(mapping.supported, mapping.supported_version));
        }
    }

    next
}

/// All frameworks `framework` can consume besides itself, breadth first
pub fn expand(framework: &NuGetFramework) -> Vec<NuGetFramework> {
    let mut seen = vec![framework.clone()];
    let mut queue = VecDeque::from([framework.clone()]);

    while let Some(current) = queue.pop_front() {
        for candidate in expand_once(&current) {
            if !seen.contains(&candidate) {
                seen.push(candidate.clone());
                queue.push_back(candidate);
            }
        }
    }

    seen.remove(0);
    seen
}

fn consumes_directly(target: &NuGetFramework, candidate: &NuGetFramework) -> bool {
    if !target.identifier_is(candidate.framework())
        || candidate.version() > target.version()
        || !target.profile().eq_ignore_ascii_case(candidate.profile())
    {
        return false;
    }

    !candidate.has_platform()
        || (target.platform().eq_ignore_ascii_case(candidate.platform())
            && candidate.platform_version() <= target.platform_version())
}

fn is_compatible_specific(target: &NuGetFramework, candidate: &NuGetFramework) -> bool {
    consumes_directly(target, candidate)
        || expand(target)
            .iter()
            .any(|expanded| consumes_directly(expanded, candidate))
}

/// True when a project targeting `target` can consume a package built for `candidate`
pub fn is_compatible(target: &NuGetFramework, candidate: &NuGetFramework) -> bool {
    if target.is_unsupported() || candidate.is_unsupported() {
        return false;
    }
    if candidate.is_any() || candidate.is_agnostic() {
        return true;
    }
    if !target.is_specific() {
        return false;
    }

    match (target.is_portable(), candidate.is_portable()) {
        (false, false) => is_compatible_specific(target, candidate),
        (false, true) => candidate
            .portable_frameworks()
            .iter()
            .any(|member| is_compatible_specific(target, member)),
        (true, false) => {
            let members = target.portable_frameworks();
            !members.is_empty()
                && members
                    .iter()
                    .all(|member| is_compatible_specific(member, candidate))
        }
        (true, true) => {
            let targets = target.portable_frameworks();
            let candidates = candidate.portable_frameworks();
            !targets.is_empty()
                && targets.iter().all(|t| {
                    candidates
                        .iter()
                        .any(|c| is_compatible_specific(t, c))
                })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::modern::framework::{parse, parse_with_platforms, short_folder_name};
    use rstest::rstest;

    fn fw(name: &str) -> NuGetFramework {
        parse(name).unwrap()
    }

    #[rstest]
    #[case("net45", "netstandard1.0", true)]
    #[case("net45", "netstandard1.1", true)]
    #[case("net45", "netstandard1.3", false)]
    #[case("net461", "netstandard2.0", true)]
    #[case("net451", "net40", true)]
    #[case("net40", "net45", false)]
    #[case("net40", "net40-client", true)]
    #[case("net40-client", "net40", true)]
    #[case("win81", "netcore45", true)]
    #[case("uap10.0", "win81", true)]
    #[case("uap10.0", "netstandard1.4", true)]
    #[case("netcoreapp3.1", "netstandard2.1", true)]
    #[case("netcoreapp2.1", "netstandard2.1", false)]
    #[case("wp8", "netstandard1.0", true)]
    #[case("wp8", "sl4", false)]
    #[case("monoandroid", "netstandard2.0", true)]
    #[case("net45", "any", true)]
    #[case("net45", "agnostic", true)]
    #[case("net45", "unsupported", false)]
    #[case("any", "net45", false)]
    fn is_compatible_cases(#[case] project: &str, #[case] package: &str, #[case] expected: bool) {
        assert_eq!(is_compatible(&fw(project), &fw(package)), expected);
    }

    #[rstest]
    #[case("net45", "portable-net45+win8", true)]
    #[case("net40", "portable-net45+win8", false)]
    #[case("portable-net45+win8", "net45", false)]
    #[case("portable-net45+win8", "netstandard1.1", true)]
    #[case("portable-net45+win8+wp8+wpa81", "portable-net45+win8", false)]
    #[case("portable-net45+win8", "portable-net45+win8+wp8+wpa81", true)]
    fn is_compatible_portable_cases(
        #[case] project: &str,
        #[case] package: &str,
        #[case] expected: bool,
    ) {
        assert_eq!(is_compatible(&fw(project), &fw(package)), expected);
    }

    #[test]
    fn net5_era_core_app_consumes_net_standard() {
        let project = parse_with_platforms("net5.0").unwrap();
        assert!(is_compatible(&project, &fw("netstandard2.1")));
        assert!(is_compatible(&project, &fw("netcoreapp3.1")));
        assert!(!is_compatible(&project, &fw("net48")));
    }

    #[test]
    fn platform_specific_package_requires_matching_platform() {
        let package = parse_with_platforms("net5.0-windows7.0").unwrap();
        let plain = parse_with_platforms("net6.0").unwrap();
        let windows = parse_with_platforms("net6.0-windows10.0").unwrap();
        assert!(!is_compatible(&plain, &package));
        assert!(is_compatible(&windows, &package));
    }

    #[test]
    fn expand_follows_equivalents_and_mappings() {
        let expanded: Vec<String> = expand(&fw("win81")).iter().map(short_folder_name).collect();
        assert!(expanded.contains(&"netcore451".to_string()));
        assert!(expanded.contains(&"netstandard1.2".to_string()));
        assert!(expanded.contains(&"netstandard1.1".to_string()));
        assert!(!expanded.contains(&"win81".to_string()));
    }

    #[test]
    fn mapping_frameworks_include_unbounded_sentinel() {
        assert!(
            mapping_frameworks()
                .iter()
                .any(|f| f.version() == DottedVersion::MAX)
        );
    }

    #[test]
    fn common_frameworks_gain_net5_entries_with_platforms() {
        let classic = common_frameworks();
        let with_net5 = common_frameworks_with_net5();
        assert_eq!(with_net5.len(), classic.len() + NET5_ERA_FOLDERS.len());
        assert!(
            classic
                .iter()
                .all(|f| f.version().major < 5 || !f.identifier_is(ids::NET_CORE_APP))
        );
    }
}
