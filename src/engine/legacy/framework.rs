//! `FrameworkName` parsing, short names and compatibility as `VersionUtility` does them

use std::fmt;

use crate::engine::{DottedVersion, EngineError};

pub const NET_FRAMEWORK: &str = ".NETFramework";
pub const NET_CORE: &str = ".NETCore";
pub const NET_STANDARD: &str = ".NETStandard";
pub const PORTABLE: &str = ".NETPortable";
pub const SILVERLIGHT: &str = "Silverlight";
pub const WINDOWS_PHONE: &str = "WindowsPhone";
pub const WINDOWS_PHONE_APP: &str = "WindowsPhoneApp";
pub const UNSUPPORTED: &str = "Unsupported";

/// (short, identifier); the first entry per identifier is the one written back out
const IDENTIFIERS: &[(&str, &str)] = &[
    ("net", NET_FRAMEWORK),
    ("netcore", NET_CORE),
    ("win", NET_CORE),
    ("winrt", NET_CORE),
    ("sl", SILVERLIGHT),
    ("wp", WINDOWS_PHONE),
    ("wpa", WINDOWS_PHONE_APP),
    ("portable", PORTABLE),
    ("netmf", ".NETMicroFramework"),
    ("monoandroid", "MonoAndroid"),
    ("monotouch", "MonoTouch"),
    ("monomac", "MonoMac"),
    ("xamarinios", "Xamarin.iOS"),
    ("xamarinmac", "Xamarin.Mac"),
    ("native", "native"),
];

const PROFILES: &[(&str, &str)] = &[
    ("client", "Client"),
    ("full", ""),
    ("cf", "CompactFramework"),
    ("wp", "WindowsPhone"),
    ("wp71", "WindowsPhone71"),
];

/// .NET Standard version each framework line can consume, lowest version first
const NET_STANDARD_SUPPORT: &[(&str, DottedVersion, DottedVersion)] = &[
    (NET_FRAMEWORK, DottedVersion::of(4, 5), DottedVersion::of(1, 1)),
    (NET_FRAMEWORK, DottedVersion::new(4, 5, 1, 0), DottedVersion::of(1, 2)),
    (NET_FRAMEWORK, DottedVersion::of(4, 6), DottedVersion::of(1, 3)),
    (NET_FRAMEWORK, DottedVersion::new(4, 6, 1, 0), DottedVersion::of(1, 4)),
    (NET_CORE, DottedVersion::of(4, 5), DottedVersion::of(1, 1)),
    (NET_CORE, DottedVersion::new(4, 5, 1, 0), DottedVersion::of(1, 2)),
    (NET_CORE, DottedVersion::of(5, 0), DottedVersion::of(1, 4)),
    (WINDOWS_PHONE, DottedVersion::of(8, 0), DottedVersion::of(1, 0)),
    (WINDOWS_PHONE_APP, DottedVersion::of(8, 1), DottedVersion::of(1, 2)),
];

/// `System.Runtime.Versioning.FrameworkName`
#[derive(Debug, Clone)]
pub struct FrameworkName {
    identifier: String,
    version: DottedVersion,
    profile: String,
}

impl FrameworkName {
    pub fn new(identifier: &str, version: DottedVersion, profile: &str) -> Self {
        Self {
            identifier: identifier.to_string(),
            version,
            profile: profile.to_string(),
        }
    }

    pub fn unsupported() -> Self {
        Self::new(UNSUPPORTED, DottedVersion::default(), "")
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn version(&self) -> DottedVersion {
        self.version
    }

    pub fn profile(&self) -> &str {
        &self.profile
    }

    pub fn is_portable(&self) -> bool {
        self.identifier.eq_ignore_ascii_case(PORTABLE)
    }

    fn is_unsupported(&self) -> bool {
        self.identifier.eq_ignore_ascii_case(UNSUPPORTED)
    }

    /// `Identifier,Version=vX.Y[,Profile=P]`
    pub fn full_name(&self) -> String {
        let mut name = format!("{},Version=v{}", self.identifier, self.version.display_short());
        if !self.profile.is_empty() {
            name.push_str(",Profile=");
            name.push_str(&self.profile);
        }
        name
    }

    /// Member frameworks of a portable profile written as `net45+win8`
    pub fn portable_members(&self, netstandard: bool) -> Vec<FrameworkName> {
        if !self.is_portable() {
            return Vec::new();
        }
        self.profile
            .split('+')
            .filter(|part| !part.is_empty())
            .filter_map(|part| parse_short(part, netstandard).ok())
            .collect()
    }
}

impl PartialEq for FrameworkName {
    fn eq(&self, other: &Self) -> bool {
        self.identifier.eq_ignore_ascii_case(&other.identifier)
            && self.version == other.version
            && self.profile.eq_ignore_ascii_case(&other.profile)
    }
}

impl Eq for FrameworkName {}

impl fmt::Display for FrameworkName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name())
    }
}

fn lookup_identifier(short: &str, netstandard: bool) -> Option<&'static str> {
    if netstandard && short == "netstandard" {
        return Some(NET_STANDARD);
    }
    IDENTIFIERS
        .iter()
        .find(|(s, _)| *s == short)
        .map(|(_, identifier)| *identifier)
}

/// `VersionUtility.ParseFrameworkName`
pub fn parse(input: &str, netstandard: bool) -> Result<FrameworkName, EngineError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(EngineError::new("Framework name cannot be empty"));
    }

    if input.contains(',') {
        return parse_full_name(input);
    }
    parse_short(input, netstandard)
}

fn parse_full_name(input: &str) -> Result<FrameworkName, EngineError> {
    let mut parts = input.split(',').map(str::trim);
    let identifier = parts.next().unwrap_or_default();
    if identifier.is_empty() {
        return Err(EngineError::new(format!("Invalid framework name '{}'", input)));
    }

    let mut version = None;
    let mut profile = "";
    for part in parts {
        match part.split_once('=') {
            Some((key, value)) if key.trim().eq_ignore_ascii_case("version") => {
                let value = value.trim().trim_start_matches(['v', 'V']);
                version = DottedVersion::parse_dotted(value);
                if version.is_none() {
                    return Err(EngineError::new(format!("Invalid framework version in '{}'", input)));
                }
            }
            Some((key, value)) if key.trim().eq_ignore_ascii_case("profile") => {
                profile = value.trim();
            }
            _ => return Err(EngineError::new(format!("Invalid framework name '{}'", input))),
        }
    }

    let version =
        version.ok_or_else(|| EngineError::new(format!("Missing framework version in '{}'", input)))?;
    Ok(FrameworkName::new(identifier, version, profile))
}

fn parse_short(input: &str, netstandard: bool) -> Result<FrameworkName, EngineError> {
    let (identifier_part, profile_part) = match input.split_once('-') {
        Some((identifier, profile)) => (identifier, profile),
        None => (input, ""),
    };

    let lower = identifier_part.to_ascii_lowercase();
    let name_len = lower
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(lower.len());
    let short = &lower[..name_len];
    let version_part = &lower[name_len..];
    if short.is_empty() || !version_part.bytes().all(|b| b.is_ascii_digit() || b == b'.') {
        return Ok(FrameworkName::unsupported());
    }

    let identifier = lookup_identifier(short, netstandard)
        .map(str::to_string)
        .unwrap_or_else(|| identifier_part[..name_len].to_string());

    if identifier == PORTABLE {
        if profile_part.is_empty() {
            return Err(EngineError::new("Portable framework names must list their frameworks"));
        }
        if profile_part.split('+').any(|member| member.contains('-') || member.is_empty()) {
            return Err(EngineError::new(format!(
                "Invalid portable frameworks '{}'",
                profile_part
            )));
        }
        return Ok(FrameworkName::new(PORTABLE, DottedVersion::default(), profile_part));
    }

    let mut version = if version_part.is_empty() {
        DottedVersion::default()
    } else if version_part.contains('.') {
        match DottedVersion::parse_dotted(version_part) {
            Some(version) => version,
            None => return Ok(FrameworkName::unsupported()),
        }
    } else {
        match DottedVersion::parse_compact(version_part) {
            Some(version) => version,
            None => return Ok(FrameworkName::unsupported()),
        }
    };

    // win and winrt name Windows Store releases; .NETCore carries the runtime version
    if identifier == NET_CORE && short != "netcore" {
        version = match (version.major, version.minor) {
            (0, 0) | (8, 0) => DottedVersion::of(4, 5),
            (8, 1) => DottedVersion::new(4, 5, 1, 0),
            _ => version,
        };
    }

    let profile = PROFILES
        .iter()
        .find(|(short, _)| short.eq_ignore_ascii_case(profile_part))
        .map(|(_, full)| full.to_string())
        .unwrap_or_else(|| profile_part.to_string());

    Ok(FrameworkName::new(&identifier, version, &profile))
}

/// `VersionUtility.GetShortFrameworkName`
pub fn short_name(framework: &FrameworkName) -> String {
    if framework.is_portable() {
        return format!("portable-{}", framework.profile);
    }

    if framework.identifier == NET_CORE {
        if framework.version == DottedVersion::of(4, 5) {
            return "win8".to_string();
        }
        if framework.version == DottedVersion::new(4, 5, 1, 0) {
            return "win81".to_string();
        }
    }

    let short = if framework.identifier == NET_STANDARD {
        "netstandard".to_string()
    } else {
        IDENTIFIERS
            .iter()
            .find(|(_, identifier)| identifier.eq_ignore_ascii_case(&framework.identifier))
            .map(|(short, _)| short.to_string())
            .unwrap_or_else(|| framework.identifier.to_ascii_lowercase())
    };

    let mut name = short;
    if !framework.version.is_zero() {
        name.push_str(
            &framework
                .version
                .display_compact()
                .unwrap_or_else(|| framework.version.display_short()),
        );
    }
    if !framework.profile.is_empty() {
        let profile = PROFILES
            .iter()
            .find(|(_, full)| !full.is_empty() && full.eq_ignore_ascii_case(&framework.profile))
            .map(|(short, _)| short.to_string())
            .unwrap_or_else(|| framework.profile.clone());
        name.push('-');
        name.push_str(&profile);
    }
    name
}

fn profile_compatible(project: &FrameworkName, package: &FrameworkName) -> bool {
    project.profile.eq_ignore_ascii_case(&package.profile)
        || (project.profile.is_empty() && package.profile.eq_ignore_ascii_case("Client"))
}

fn supported_net_standard(project: &FrameworkName) -> Option<DottedVersion> {
    NET_STANDARD_SUPPORT
        .iter()
        .filter(|(identifier, min, _)| {
            project.identifier.eq_ignore_ascii_case(identifier) && project.version >= *min
        })
        .map(|(_, _, supported)| *supported)
        .max()
}

fn is_compatible_specific(project: &FrameworkName, package: &FrameworkName, netstandard: bool) -> bool {
    if project.identifier.eq_ignore_ascii_case(&package.identifier) {
        return package.version <= project.version && profile_compatible(project, package);
    }

    netstandard
        && package.identifier == NET_STANDARD
        && supported_net_standard(project).is_some_and(|supported| package.version <= supported)
}

/// `VersionUtility.IsCompatible`
pub fn is_compatible(project: &FrameworkName, package: &FrameworkName, netstandard: bool) -> bool {
    if project.is_unsupported() || package.is_unsupported() {
        return false;
    }

    match (project.is_portable(), package.is_portable()) {
        (false, false) => is_compatible_specific(project, package, netstandard),
        (false, true) => package
            .portable_members(netstandard)
            .iter()
            .any(|member| is_compatible_specific(project, member, netstandard)),
        (true, false) => {
            let members = project.portable_members(netstandard);
            !members.is_empty()
                && members
                    .iter()
                    .all(|member| is_compatible_specific(member, package, netstandard))
        }
        (true, true) => {
            let projects = project.portable_members(netstandard);
            let packages = package.portable_members(netstandard);
            !projects.is_empty()
                && projects.iter().all(|p| {
                    packages
                        .iter()
                        .any(|c| is_compatible_specific(p, c, netstandard))
                })
        }
    }
}

fn version_weight(version: DottedVersion) -> i64 {
    version
        .parts()
        .iter()
        .fold(0i64, |acc, part| acc * 100 + i64::from((*part).min(99)))
}

fn score(project: &FrameworkName, package: &FrameworkName, netstandard: bool) -> i64 {
    if project == package {
        return i64::MAX;
    }
    if project.identifier.eq_ignore_ascii_case(&package.identifier) {
        let profile_bonus = if project.profile.eq_ignore_ascii_case(&package.profile) { 1 } else { 0 };
        return 3_000_000_000 + version_weight(package.version) * 2 + profile_bonus;
    }
    if package.identifier == NET_STANDARD {
        return 2_000_000_000 + version_weight(package.version);
    }
    if package.is_portable() {
        let members = package.portable_members(netstandard).len() as i64;
        return 1_000_000_000 - members;
    }
    0
}

/// Highest scoring compatible framework; the first one wins a tie
pub fn get_nearest(
    project: &FrameworkName,
    candidates: &[FrameworkName],
    netstandard: bool,
) -> Option<FrameworkName> {
    let mut best: Option<(i64, &FrameworkName)> = None;
    for candidate in candidates {
        if !is_compatible(project, candidate, netstandard) {
            continue;
        }
        let candidate_score = score(project, candidate, netstandard);
        if best.is_none_or(|(best_score, _)| candidate_score > best_score) {
            best = Some((candidate_score, candidate));
        }
    }
    best.map(|(_, framework)| framework.clone())
}

/// Frameworks `VersionUtility` has names for
pub fn known_frameworks(netstandard: bool) -> Vec<FrameworkName> {
    let mut folders = vec![
        "net20", "net35", "net40", "net40-client", "net403", "net45", "net451", "net452",
        "net46", "net461", "win8", "win81", "netcore50", "sl4", "sl5", "wp7", "wp71", "wp8",
        "wp81", "wpa81", "monoandroid", "monotouch", "xamarinios", "xamarinmac",
    ];
    if netstandard {
        folders.extend([
            "netstandard1.0", "netstandard1.1", "netstandard1.2", "netstandard1.3",
            "netstandard1.4", "netstandard1.5", "netstandard1.6",
        ]);
    }
    folders
        .into_iter()
        .filter_map(|folder| parse(folder, netstandard).ok())
        .collect()
}
