//! `SemanticVersion` and `VersionSpec`

use std::cmp::Ordering;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::engine::{DottedVersion, EngineError};

static SEMVER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?P<version>\d+(?:\.\d+){0,3})(?:-(?P<special>[a-z][0-9a-z-]*))?$")
        .unwrap()
});

/// Version with one optional special label starting with a letter
#[derive(Debug, Clone)]
pub struct SemanticVersion {
    version: DottedVersion,
    special: String,
    original: String,
}

impl SemanticVersion {
    pub fn parse(input: &str) -> Result<Self, EngineError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(EngineError::new("Version cannot be empty"));
        }

        let captures = SEMVER_PATTERN
            .captures(trimmed)
            .ok_or_else(|| EngineError::new(format!("'{}' is not a valid version string", input)))?;

        let numbers = captures.name("version").map(|m| m.as_str()).unwrap_or_default();
        let version = DottedVersion::parse_dotted(numbers)
            .ok_or_else(|| EngineError::new(format!("'{}' is not a valid version string", input)))?;
        let special = captures
            .name("special")
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();

        Ok(Self {
            version,
            special,
            original: trimmed.to_string(),
        })
    }

    pub fn version(&self) -> DottedVersion {
        self.version
    }

    pub fn special_version(&self) -> &str {
        &self.special
    }

    pub fn is_prerelease(&self) -> bool {
        !self.special.is_empty()
    }

    /// Three numeric parts, the fourth only when non-zero, then `-special`
    pub fn to_normalized_string(&self) -> String {
        let v = self.version;
        let mut s = format!("{}.{}.{}", v.major, v.minor, v.build);
        if v.revision > 0 {
            s.push_str(&format!(".{}", v.revision));
        }
        if self.is_prerelease() {
            s.push('-');
            s.push_str(&self.special);
        }
        s
    }
}

/// Numeric parts, then stable above prerelease, then special labels case-insensitively
pub fn compare(a: &SemanticVersion, b: &SemanticVersion) -> Ordering {
    a.version
        .cmp(&b.version)
        .then_with(|| match (a.is_prerelease(), b.is_prerelease()) {
            (false, false) => Ordering::Equal,
            (false, true) => Ordering::Greater,
            (true, false) => Ordering::Less,
            (true, true) => a
                .special
                .to_ascii_lowercase()
                .cmp(&b.special.to_ascii_lowercase()),
        })
}

impl PartialEq for SemanticVersion {
    fn eq(&self, other: &Self) -> bool {
        compare(self, other) == Ordering::Equal
    }
}

impl Eq for SemanticVersion {}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

/// Version interval; no floating forms
#[derive(Debug, Clone)]
pub struct VersionSpec {
    pub min: Option<SemanticVersion>,
    pub min_inclusive: bool,
    pub max: Option<SemanticVersion>,
    pub max_inclusive: bool,
}

impl VersionSpec {
    /// `VersionUtility.ParseVersionSpec`
    pub fn parse(input: &str) -> Result<Self, EngineError> {
        let invalid = || EngineError::new(format!("'{}' is not a valid version spec", input));

        let value = input.trim();
        if value.is_empty() {
            return Err(EngineError::new("Version spec cannot be empty"));
        }

        if !value.starts_with(['[', '(']) {
            let min = SemanticVersion::parse(value).map_err(|_| invalid())?;
            return Ok(Self {
                min: Some(min),
                min_inclusive: true,
                max: None,
                max_inclusive: false,
            });
        }

        if value.len() < 3 {
            return Err(invalid());
        }
        let min_inclusive = value.starts_with('[');
        let max_inclusive = match value.chars().last() {
            Some(']') => true,
            Some(')') => false,
            _ => return Err(invalid()),
        };
        let inner = &value[1..value.len() - 1];
        let parts: Vec<&str> = inner.split(',').map(str::trim).collect();

        let spec = match parts.as_slice() {
            [single] if min_inclusive && max_inclusive => {
                let version = SemanticVersion::parse(single).map_err(|_| invalid())?;
                Self {
                    min: Some(version.clone()),
                    min_inclusive: true,
                    max: Some(version),
                    max_inclusive: true,
                }
            }
            [min, max] if !(min.is_empty() && max.is_empty()) => {
                let parse_bound = |bound: &str| {
                    if bound.is_empty() {
                        Ok(None)
                    } else {
                        SemanticVersion::parse(bound).map(Some).map_err(|_| invalid())
                    }
                };
                Self {
                    min: parse_bound(min)?,
                    min_inclusive,
                    max: parse_bound(max)?,
                    max_inclusive,
                }
            }
            _ => return Err(invalid()),
        };

        if let (Some(min), Some(max)) = (&spec.min, &spec.max) {
            if compare(min, max) == Ordering::Greater {
                return Err(invalid());
            }
        }

        Ok(spec)
    }

    fn is_exact(&self) -> bool {
        match (&self.min, &self.max) {
            (Some(min), Some(max)) => self.min_inclusive && self.max_inclusive && min == max,
            _ => false,
        }
    }

    pub fn satisfies(&self, version: &SemanticVersion) -> bool {
        let above_min = match &self.min {
            Some(min) if self.min_inclusive => compare(version, min) != Ordering::Less,
            Some(min) => compare(version, min) == Ordering::Greater,
            None => true,
        };
        let below_max = match &self.max {
            Some(max) if self.max_inclusive => compare(version, max) != Ordering::Greater,
            Some(max) => compare(version, max) == Ordering::Less,
            None => true,
        };
        above_min && below_max
    }

    fn bracketed(&self, format: impl Fn(&SemanticVersion) -> String) -> String {
        if let (true, Some(min)) = (self.is_exact(), &self.min) {
            return format!("[{}]", format(min));
        }
        format!(
            "{}{}, {}{}",
            if self.min_inclusive && self.min.is_some() { '[' } else { '(' },
            self.min.as_ref().map(&format).unwrap_or_default(),
            self.max.as_ref().map(&format).unwrap_or_default(),
            if self.max_inclusive && self.max.is_some() { ']' } else { ')' },
        )
    }

    pub fn to_normalized_string(&self) -> String {
        self.bracketed(SemanticVersion::to_normalized_string)
    }

    /// `VersionPrettyPrint`: `(≥ 1.0 && < 2.0)`
    pub fn pretty_print(&self) -> String {
        if let (true, Some(min)) = (self.is_exact(), &self.min) {
            return format!("(= {})", min);
        }

        let mut parts = Vec::new();
        if let Some(min) = &self.min {
            parts.push(format!("{} {}", if self.min_inclusive { "≥" } else { ">" }, min));
        }
        if let Some(max) = &self.max {
            parts.push(format!("{} {}", if self.max_inclusive { "≤" } else { "<" }, max));
        }
        if parts.is_empty() {
            String::new()
        } else {
            format!("({})", parts.join(" && "))
        }
    }
}

/// A plain minimum prints as the bare version, everything else bracketed
impl fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.min, &self.max) {
            (Some(min), None) if self.min_inclusive => write!(f, "{}", min),
            _ => f.write_str(&self.bracketed(|v| v.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn v(s: &str) -> SemanticVersion {
        SemanticVersion::parse(s).unwrap()
    }

    #[rstest]
    #[case("1", "1.0.0")]
    #[case("1.0", "1.0.0")]
    #[case("1.2.3.4", "1.2.3.4")]
    #[case("1.0-beta", "1.0.0-beta")]
    #[case("1.0.0-RC-2", "1.0.0-RC-2")]
    fn parse_normalizes(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(v(input).to_normalized_string(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("1.0.0-beta.1")]
    #[case("1.0.0-1beta")]
    #[case("1.0.0+meta")]
    #[case("1.0.0.0.0")]
    #[case("v1.0")]
    fn parse_rejects_semver2_and_garbage(#[case] input: &str) {
        assert!(SemanticVersion::parse(input).is_err(), "{input} should not parse");
    }

    #[rstest]
    #[case("1.0", "2.0.0-beta", Ordering::Less)]
    #[case("2.0", "1.0.0-beta", Ordering::Greater)]
    #[case("1", "1.0.0.0", Ordering::Equal)]
    #[case("1.0-alpha", "1.0-Beta", Ordering::Less)]
    #[case("1.0-beta", "1.0", Ordering::Less)]
    fn compare_orders_versions(#[case] a: &str, #[case] b: &str, #[case] expected: Ordering) {
        assert_eq!(compare(&v(a), &v(b)), expected);
    }

    #[rstest]
    #[case("1.0", "1.0", "(≥ 1.0)", "[1.0.0, )")]
    #[case("[1.0]", "[1.0]", "(= 1.0)", "[1.0.0]")]
    #[case("[1.0, 2.0)", "[1.0, 2.0)", "(≥ 1.0 && < 2.0)", "[1.0.0, 2.0.0)")]
    #[case("(,2.0]", "(, 2.0]", "(≤ 2.0)", "(, 2.0.0]")]
    fn spec_formats(
        #[case] input: &str,
        #[case] display: &str,
        #[case] pretty: &str,
        #[case] normalized: &str,
    ) {
        let spec = VersionSpec::parse(input).unwrap();
        assert_eq!(spec.to_string(), display);
        assert_eq!(spec.pretty_print(), pretty);
        assert_eq!(spec.to_normalized_string(), normalized);
    }

    #[rstest]
    #[case("1.0.*")]
    #[case("(1.0)")]
    #[case("(,)")]
    #[case("[2.0, 1.0]")]
    #[case("[1.0")]
    fn spec_rejects(#[case] input: &str) {
        assert!(VersionSpec::parse(input).is_err(), "{input} should not parse");
    }

    #[rstest]
    #[case("[1.0.0, 2.0.0]", "1.5.0", true)]
    #[case("[1.0.0, 2.0.0]", "2.1.0", false)]
    #[case("(1.0, 2.0)", "1.0", false)]
    #[case("1.0", "0.9", false)]
    fn spec_satisfies(#[case] spec: &str, #[case] version: &str, #[case] expected: bool) {
        assert_eq!(VersionSpec::parse(spec).unwrap().satisfies(&v(version)), expected);
    }
}
