//! `NuGetFramework`: target framework identity and its string encodings
//!
//! A framework is written either as a short folder name (`net45`, `netstandard1.6`,
//! `portable-net45+win8`, `net5.0-windows7.0`) or as a .NET framework name
//! (`.NETFramework,Version=v4.5,Profile=Client`). Input containing a comma is always
//! read as the latter.

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::engine::modern::portable;
use crate::engine::{DottedVersion, EngineError};

pub mod identifiers {
    pub const NET_FRAMEWORK: &str = ".NETFramework";
    pub const NET_STANDARD: &str = ".NETStandard";
    pub const NET_STANDARD_APP: &str = ".NETStandardApp";
    pub const NET_CORE_APP: &str = ".NETCoreApp";
    pub const NET_CORE: &str = ".NETCore";
    pub const NET_MICRO: &str = ".NETMicroFramework";
    pub const WINDOWS: &str = "Windows";
    pub const WINDOWS_PHONE: &str = "WindowsPhone";
    pub const WINDOWS_PHONE_APP: &str = "WindowsPhoneApp";
    pub const SILVERLIGHT: &str = "Silverlight";
    pub const PORTABLE: &str = ".NETPortable";
    pub const UAP: &str = "UAP";
    pub const MONO_ANDROID: &str = "MonoAndroid";
    pub const MONO_TOUCH: &str = "MonoTouch";
    pub const MONO_MAC: &str = "MonoMac";
    pub const XAMARIN_IOS: &str = "Xamarin.iOS";
    pub const XAMARIN_MAC: &str = "Xamarin.Mac";
    pub const XAMARIN_TVOS: &str = "Xamarin.TVOS";
    pub const XAMARIN_WATCHOS: &str = "Xamarin.WatchOS";
    pub const DNX: &str = "DNX";
    pub const DNX_CORE: &str = "DNXCore";
    pub const TIZEN: &str = "Tizen";
    pub const NATIVE: &str = "native";
    pub const ANY: &str = "Any";
    pub const AGNOSTIC: &str = "Agnostic";
    pub const UNSUPPORTED: &str = "Unsupported";
}

use identifiers as ids;

struct IdentifierInfo {
    full: &'static str,
    short: &'static str,
    /// Short folder names keep the dots (`netstandard1.6`) instead of compacting digits
    dotted: bool,
}

const IDENTIFIERS: &[IdentifierInfo] = &[
    IdentifierInfo { full: ids::NET_FRAMEWORK, short: "net", dotted: false },
    IdentifierInfo { full: ids::NET_STANDARD, short: "netstandard", dotted: true },
    IdentifierInfo { full: ids::NET_STANDARD_APP, short: "netstandardapp", dotted: true },
    IdentifierInfo { full: ids::NET_CORE_APP, short: "netcoreapp", dotted: true },
    IdentifierInfo { full: ids::NET_CORE, short: "netcore", dotted: false },
    IdentifierInfo { full: ids::NET_MICRO, short: "netmf", dotted: false },
    IdentifierInfo { full: ids::WINDOWS, short: "win", dotted: false },
    IdentifierInfo { full: ids::WINDOWS_PHONE, short: "wp", dotted: false },
    IdentifierInfo { full: ids::WINDOWS_PHONE_APP, short: "wpa", dotted: false },
    IdentifierInfo { full: ids::SILVERLIGHT, short: "sl", dotted: false },
    IdentifierInfo { full: ids::PORTABLE, short: "portable", dotted: false },
    IdentifierInfo { full: ids::UAP, short: "uap", dotted: true },
    IdentifierInfo { full: ids::MONO_ANDROID, short: "monoandroid", dotted: false },
    IdentifierInfo { full: ids::MONO_TOUCH, short: "monotouch", dotted: false },
    IdentifierInfo { full: ids::MONO_MAC, short: "monomac", dotted: false },
    IdentifierInfo { full: ids::XAMARIN_IOS, short: "xamarinios", dotted: false },
    IdentifierInfo { full: ids::XAMARIN_MAC, short: "xamarinmac", dotted: false },
    IdentifierInfo { full: ids::XAMARIN_TVOS, short: "xamarintvos", dotted: false },
    IdentifierInfo { full: ids::XAMARIN_WATCHOS, short: "xamarinwatchos", dotted: false },
    IdentifierInfo { full: ids::DNX, short: "dnx", dotted: false },
    IdentifierInfo { full: ids::DNX_CORE, short: "dnxcore", dotted: false },
    IdentifierInfo { full: ids::TIZEN, short: "tizen", dotted: false },
    IdentifierInfo { full: ids::NATIVE, short: "native", dotted: false },
];

const SPECIAL_IDENTIFIERS: &[&str] = &[ids::ANY, ids::AGNOSTIC, ids::UNSUPPORTED];

/// Identifiers whose short names drop a trailing `.0` minor (`win8`, `wp8`, `sl4`)
const SINGLE_DIGIT_IDENTIFIERS: &[&str] = &[ids::WINDOWS, ids::WINDOWS_PHONE, ids::SILVERLIGHT];

/// (full profile, short profile)
const PROFILES: &[(&str, &str)] = &[
    ("Client", "client"),
    ("CompactFramework", "cf"),
    ("WindowsPhone", "wp"),
    ("WindowsPhone71", "wp71"),
];

fn identifier_by_short(short: &str) -> Option<&'static IdentifierInfo> {
    IDENTIFIERS.iter().find(|info| info.short == short)
}

fn identifier_by_full(full: &str) -> Option<&'static IdentifierInfo> {
    IDENTIFIERS
        .iter()
        .find(|info| info.full.eq_ignore_ascii_case(full))
}

fn canonical_identifier(identifier: &str) -> String {
    if let Some(info) = identifier_by_full(identifier) {
        return info.full.to_string();
    }
    SPECIAL_IDENTIFIERS
        .iter()
        .find(|special| special.eq_ignore_ascii_case(identifier))
        .map(|special| special.to_string())
        .unwrap_or_else(|| identifier.to_string())
}

#[derive(Debug, Clone)]
pub struct NuGetFramework {
    framework: String,
    version: DottedVersion,
    profile: String,
    platform: String,
    platform_version: DottedVersion,
}

impl NuGetFramework {
    pub fn new(framework: &str, version: DottedVersion) -> Self {
        Self::with_profile(framework, version, "")
    }

    pub fn with_profile(framework: &str, version: DottedVersion, profile: &str) -> Self {
        Self {
            framework: canonical_identifier(framework),
            version,
            profile: profile.to_string(),
            platform: String::new(),
            platform_version: DottedVersion::default(),
        }
    }

    pub fn with_platform(
        framework: &str,
        version: DottedVersion,
        platform: &str,
        platform_version: DottedVersion,
    ) -> Self {
        Self {
            platform: platform.to_string(),
            platform_version,
            ..Self::new(framework, version)
        }
    }

    pub fn any() -> Self {
        Self::new(ids::ANY, DottedVersion::default())
    }

    pub fn agnostic() -> Self {
        Self::new(ids::AGNOSTIC, DottedVersion::default())
    }

    pub fn unsupported() -> Self {
        Self::new(ids::UNSUPPORTED, DottedVersion::default())
    }

    pub fn framework(&self) -> &str {
        &self.framework
    }

    pub fn version(&self) -> DottedVersion {
        self.version
    }

    pub fn profile(&self) -> &str {
        &self.profile
    }

    pub fn platform(&self) -> &str {
        &self.platform
    }

    pub fn platform_version(&self) -> DottedVersion {
        self.platform_version
    }

    pub fn has_profile(&self) -> bool {
        !self.profile.is_empty()
    }

    pub fn has_platform(&self) -> bool {
        !self.platform.is_empty()
    }

    pub fn is_any(&self) -> bool {
        self.framework == ids::ANY
    }

    pub fn is_agnostic(&self) -> bool {
        self.framework == ids::AGNOSTIC
    }

    pub fn is_unsupported(&self) -> bool {
        self.framework == ids::UNSUPPORTED
    }

    pub fn is_portable(&self) -> bool {
        self.framework == ids::PORTABLE
    }

    pub fn is_specific(&self) -> bool {
        !(self.is_any() || self.is_agnostic() || self.is_unsupported())
    }

    pub fn identifier_is(&self, identifier: &str) -> bool {
        self.framework.eq_ignore_ascii_case(identifier)
    }

    /// Frameworks a portable profile targets; empty for non-portable frameworks
    pub fn portable_frameworks(&self) -> Vec<NuGetFramework> {
        if !self.is_portable() {
            return Vec::new();
        }

        if let Some(number) = portable::profile_number(&self.profile) {
            return portable::find_by_number(number)
                .map(|profile| {
                    profile
                        .frameworks
                        .iter()
                        .filter_map(|folder| parse_short(folder, false).ok())
                        .collect()
                })
                .unwrap_or_default();
        }

        self.profile
            .split('+')
            .filter(|part| !part.is_empty())
            .filter_map(|part| parse_short(part, false).ok())
            .collect()
    }

    /// `.NETFramework,Version=v4.5[,Profile=Client]`
    pub fn dotnet_framework_name(&self) -> String {
        let mut name = format!(
            "{},Version=v{}",
            self.framework,
            self.version.display_short()
        );
        if self.has_profile() {
            name.push_str(",Profile=");
            name.push_str(&self.profile);
        }
        name
    }

    fn key(&self) -> (String, DottedVersion, String, String, DottedVersion) {
        (
            self.framework.to_ascii_lowercase(),
            self.version,
            self.profile.to_ascii_lowercase(),
            self.platform.to_ascii_lowercase(),
            self.platform_version,
        )
    }
}

impl PartialEq for NuGetFramework {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for NuGetFramework {}

impl Hash for NuGetFramework {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Display for NuGetFramework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dotnet_framework_name())?;
        if self.has_platform() {
            write!(f, "-{}", self.platform)?;
            if !self.platform_version.is_zero() {
                f.write_str(&self.platform_version.display_short())?;
            }
        }
        Ok(())
    }
}

/// Parse without `net5.0+` platform support (releases before 5.8)
pub fn parse(input: &str) -> Result<NuGetFramework, EngineError> {
    parse_with_options(input, false)
}

/// Parse with `net5.0+` short names mapping to `.NETCoreApp` and platform suffixes
pub fn parse_with_platforms(input: &str) -> Result<NuGetFramework, EngineError> {
    parse_with_options(input, true)
}

fn parse_with_options(input: &str, platforms: bool) -> Result<NuGetFramework, EngineError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(EngineError::new("Framework name cannot be empty"));
    }

    if input.contains(',') {
        parse_dotnet_framework_name(input)
    } else {
        parse_short(input, platforms)
    }
}

fn parse_dotnet_framework_name(input: &str) -> Result<NuGetFramework, EngineError> {
    let mut parts = input.split(',').map(str::trim);
    let identifier = parts.next().unwrap_or_default();
    if identifier.is_empty() {
        return Err(EngineError::new(format!(
            "Invalid framework name '{}': missing identifier",
            input
        )));
    }

    let mut version = None;
    let mut profile = String::new();

    for part in parts {
        let Some((key, value)) = part.split_once('=') else {
            return Err(EngineError::new(format!(
                "Invalid framework name '{}': expected key=value, found '{}'",
                input, part
            )));
        };
        let value = value.trim();
        match key.trim().to_ascii_lowercase().as_str() {
            "version" => {
                let digits = value.trim_start_matches(['v', 'V']);
                version = Some(DottedVersion::parse_dotted(digits).ok_or_else(|| {
                    EngineError::new(format!("Invalid framework version '{}'", value))
                })?);
            }
            "profile" => profile = value.to_string(),
            other => {
                return Err(EngineError::new(format!(
                    "Invalid framework name '{}': unknown key '{}'",
                    input, other
                )));
            }
        }
    }

    let Some(version) = version else {
        return Err(EngineError::new(format!(
            "Invalid framework name '{}': missing Version",
            input
        )));
    };

    if identifier.eq_ignore_ascii_case(ids::PORTABLE) && profile.contains('-') {
        return Err(portable_hyphen_error(&profile));
    }

    Ok(NuGetFramework::with_profile(identifier, version, &profile))
}

fn portable_hyphen_error(frameworks: &str) -> EngineError {
    EngineError::new(format!(
        "Invalid portable frameworks '{}'. A hyphen may not be in any of the portable framework names.",
        frameworks
    ))
}

fn parse_version_part(part: &str) -> Option<DottedVersion> {
    if part.is_empty() {
        Some(DottedVersion::default())
    } else if part.contains('.') {
        DottedVersion::parse_dotted(part)
    } else {
        DottedVersion::parse_compact(part)
    }
}

fn parse_short(input: &str, platforms: bool) -> Result<NuGetFramework, EngineError> {
    let lower = input.to_ascii_lowercase();

    match lower.as_str() {
        "any" => return Ok(NuGetFramework::any()),
        "agnostic" => return Ok(NuGetFramework::agnostic()),
        "unsupported" => return Ok(NuGetFramework::unsupported()),
        _ => {}
    }

    if lower == "portable" || lower.starts_with("portable-") {
        return parse_portable(&input["portable".len()..]);
    }

    let id_len = lower
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(lower.len());
    let Some(info) = identifier_by_short(&lower[..id_len]) else {
        return Ok(NuGetFramework::unsupported());
    };

    let rest = &input[id_len..];
    let (version_part, suffix) = match rest.split_once('-') {
        Some((version, suffix)) => (version, Some(suffix)),
        None => (rest, None),
    };

    let Some(version) = parse_version_part(version_part) else {
        return Ok(NuGetFramework::unsupported());
    };

    if platforms && info.full == ids::NET_FRAMEWORK && version.major >= 5 {
        return match suffix {
            None => Ok(NuGetFramework::new(ids::NET_CORE_APP, version)),
            Some(platform) => parse_platform(version, platform),
        };
    }

    let profile = match suffix {
        None => String::new(),
        Some(short) => PROFILES
            .iter()
            .find(|(_, s)| s.eq_ignore_ascii_case(short))
            .map(|(full, _)| full.to_string())
            .unwrap_or_else(|| {
                if short.eq_ignore_ascii_case("full") {
                    String::new()
                } else {
                    short.to_string()
                }
            }),
    };

    Ok(NuGetFramework::with_profile(info.full, version, &profile))
}

fn parse_platform(version: DottedVersion, platform: &str) -> Result<NuGetFramework, EngineError> {
    let name_len = platform
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(platform.len());
    if name_len == 0 {
        return Err(EngineError::new(format!(
            "Invalid platform '{}': missing platform name",
            platform
        )));
    }

    let Some(platform_version) = parse_version_part_dotted(&platform[name_len..]) else {
        return Ok(NuGetFramework::unsupported());
    };

    Ok(NuGetFramework::with_platform(
        ids::NET_CORE_APP,
        version,
        &platform[..name_len],
        platform_version,
    ))
}

fn parse_version_part_dotted(part: &str) -> Option<DottedVersion> {
    if part.is_empty() {
        Some(DottedVersion::default())
    } else {
        DottedVersion::parse_dotted(part)
    }
}

fn parse_portable(rest: &str) -> Result<NuGetFramework, EngineError> {
    let body = rest.strip_prefix('-').unwrap_or(rest);
    if body.is_empty() {
        return Ok(NuGetFramework::new(ids::PORTABLE, DottedVersion::default()));
    }

    if let Some(number) = portable::profile_number(body) {
        let version = portable::find_by_number(number)
            .map(|profile| profile.version)
            .unwrap_or_default();
        return Ok(NuGetFramework::with_profile(
            ids::PORTABLE,
            version,
            &format!("Profile{}", number),
        ));
    }

    let mut folders = Vec::new();
    for part in body.split('+') {
        if part.contains('-') {
            return Err(portable_hyphen_error(body));
        }
        if part.is_empty() {
            return Err(EngineError::new(format!(
                "Invalid portable frameworks '{}': empty framework name",
                body
            )));
        }
        let framework = parse_short(part, false)?;
        if !framework.is_specific() || framework.is_portable() {
            return Err(EngineError::new(format!(
                "Invalid portable frameworks '{}': '{}' is not a framework",
                body, part
            )));
        }
        folders.push(format_short(&framework, false));
    }

    Ok(match portable::find_by_frameworks(&folders) {
        Some(profile) => NuGetFramework::with_profile(
            ids::PORTABLE,
            profile.version,
            &format!("Profile{}", profile.number),
        ),
        None => NuGetFramework::with_profile(ids::PORTABLE, DottedVersion::default(), &folders.join("+")),
    })
}

/// Short folder name without `net5.0+` era formatting (releases before 5.8)
pub fn short_folder_name(framework: &NuGetFramework) -> String {
    format_short(framework, false)
}

pub fn short_folder_name_with_platforms(framework: &NuGetFramework) -> String {
    format_short(framework, true)
}

pub fn dotnet_framework_name(framework: &NuGetFramework) -> String {
    framework.dotnet_framework_name()
}

pub fn to_string(framework: &NuGetFramework) -> String {
    framework.to_string()
}

/// Platform name and version (`windows`, 7.0)
pub fn platform(framework: &NuGetFramework) -> (String, DottedVersion) {
    (framework.platform.clone(), framework.platform_version)
}

fn format_short(framework: &NuGetFramework, platforms: bool) -> String {
    if !framework.is_specific() {
        return framework.framework.to_ascii_lowercase();
    }

    if framework.is_portable() {
        let members: Vec<String> = framework
            .portable_frameworks()
            .iter()
            .map(|f| format_short(f, false))
            .collect();
        return if members.is_empty() {
            "portable".to_string()
        } else {
            format!("portable-{}", members.join("+"))
        };
    }

    let net5_era = platforms
        && framework.identifier_is(ids::NET_CORE_APP)
        && framework.version.major >= 5;

    let (short, dotted) = if net5_era {
        ("net".to_string(), true)
    } else {
        match identifier_by_full(&framework.framework) {
            Some(info) => (info.short.to_string(), info.dotted),
            None => (framework.framework.to_ascii_lowercase(), false),
        }
    };

    let mut name = short;
    if !framework.version.is_zero() {
        let single_digit = SINGLE_DIGIT_IDENTIFIERS
            .iter()
            .any(|id| framework.identifier_is(id));
        let compact = if dotted {
            None
        } else if single_digit {
            framework.version.display_single_digit()
        } else {
            framework.version.display_compact()
        };
        let version = compact.unwrap_or_else(|| framework.version.display_short());
        name.push_str(&version);
    }

    if net5_era && framework.has_platform() {
        name.push('-');
        name.push_str(&framework.platform);
        if !framework.platform_version.is_zero() {
            name.push_str(&framework.platform_version.display_short());
        }
    } else if framework.has_profile() {
        let profile = PROFILES
            .iter()
            .find(|(full, _)| full.eq_ignore_ascii_case(&framework.profile))
            .map(|(_, short)| short.to_string())
            .unwrap_or_else(|| framework.profile.clone());
        name.push('-');
        name.push_str(&profile);
    }

    name
}
