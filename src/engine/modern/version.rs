//! `NuGetVersion` and the default version comparer

use std::cmp::Ordering;
use std::fmt;

use crate::engine::{EngineError, compare_release_labels};

/// Version with up to four numeric parts, SemVer 2.0 release labels and metadata
#[derive(Debug, Clone)]
pub struct NuGetVersion {
    major: u64,
    minor: u64,
    patch: u64,
    revision: u64,
    release_labels: Vec<String>,
    metadata: Option<String>,
    original: Option<String>,
}

fn is_valid_identifier(part: &str) -> bool {
    !part.is_empty()
        && part
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-')
}

impl NuGetVersion {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            revision: 0,
            release_labels: Vec::new(),
            metadata: None,
            original: None,
        }
    }

    pub fn with_release(mut self, release: &str) -> Self {
        self.release_labels = release.split('.').map(str::to_string).collect();
        self
    }

    pub fn major(&self) -> u64 {
        self.major
    }

    pub fn minor(&self) -> u64 {
        self.minor
    }

    pub fn patch(&self) -> u64 {
        self.patch
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn release_labels(&self) -> &[String] {
        &self.release_labels
    }

    pub fn release(&self) -> String {
        self.release_labels.join(".")
    }

    pub fn metadata(&self) -> Option<&str> {
        self.metadata.as_deref()
    }

    pub fn is_prerelease(&self) -> bool {
        !self.release_labels.is_empty()
    }

    /// More than one release label, or build metadata
    pub fn is_semver2(&self) -> bool {
        self.release_labels.len() > 1 || self.metadata.is_some()
    }

    pub fn numeric(&self) -> [u64; 4] {
        [self.major, self.minor, self.patch, self.revision]
    }

    /// `major.minor.patch[.revision][-release]`, revision only when non-zero
    pub fn to_normalized_string(&self) -> String {
        let mut s = format!("{}.{}.{}", self.major, self.minor, self.patch);
        if self.revision > 0 {
            s.push_str(&format!(".{}", self.revision));
        }
        if self.is_prerelease() {
            s.push('-');
            s.push_str(&self.release());
        }
        s
    }

    /// Normalized string followed by `+metadata`
    pub fn to_full_string(&self) -> String {
        let mut s = self.to_normalized_string();
        if let Some(metadata) = &self.metadata {
            s.push('+');
            s.push_str(metadata);
        }
        s
    }

    pub fn parse(input: &str) -> Result<Self, EngineError> {
        let invalid = |reason: &str| EngineError::new(format!("'{}' {}", input, reason));

        if input.trim().is_empty() {
            return Err(EngineError::new("Version cannot be empty"));
        }
        if input.trim() != input {
            return Err(invalid("has surrounding whitespace"));
        }

        let (rest, metadata) = match input.split_once('+') {
            Some((rest, metadata)) => {
                if !metadata.split('.').all(is_valid_identifier) {
                    return Err(invalid("has invalid metadata"));
                }
                (rest, Some(metadata.to_string()))
            }
            None => (input, None),
        };

        let (numbers, release) = match rest.split_once('-') {
            Some((numbers, release)) => (numbers, Some(release)),
            None => (rest, None),
        };

        let parts: Vec<&str> = numbers.split('.').collect();
        if parts.len() > 4 {
            return Err(invalid("has more than four numeric parts"));
        }
        let mut values = [0u64; 4];
        for (i, part) in parts.iter().enumerate() {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid("has a non-numeric version part"));
            }
            let value: i32 = part
                .parse()
                .map_err(|_| invalid("has a version part out of range"))?;
            values[i] = value as u64;
        }

        let mut release_labels = Vec::new();
        if let Some(release) = release {
            for label in release.split('.') {
                if !is_valid_identifier(label) {
                    return Err(invalid("has an invalid release label"));
                }
                if label.len() > 1
                    && label.starts_with('0')
                    && label.bytes().all(|b| b.is_ascii_digit())
                {
                    return Err(invalid("has a numeric release label with a leading zero"));
                }
                release_labels.push(label.to_string());
            }
        }

        Ok(Self {
            major: values[0],
            minor: values[1],
            patch: values[2],
            revision: values[3],
            release_labels,
            metadata,
            original: Some(input.to_string()),
        })
    }
}

/// Numeric parts, then stable above prerelease, then release labels. Metadata is ignored.
pub fn compare(a: &NuGetVersion, b: &NuGetVersion) -> Ordering {
    a.numeric()
        .cmp(&b.numeric())
        .then_with(|| match (a.is_prerelease(), b.is_prerelease()) {
            (false, false) => Ordering::Equal,
            (false, true) => Ordering::Greater,
            (true, false) => Ordering::Less,
            (true, true) => compare_release_labels(&a.release_labels, &b.release_labels),
        })
}

pub fn parse(input: &str) -> Result<NuGetVersion, EngineError> {
    NuGetVersion::parse(input)
}

pub fn to_normalized_string(version: &NuGetVersion) -> String {
    version.to_normalized_string()
}

pub fn to_full_string(version: &NuGetVersion) -> String {
    version.to_full_string()
}

pub fn to_string(version: &NuGetVersion) -> String {
    version.to_string()
}

pub fn is_semver2(version: &NuGetVersion) -> bool {
    version.is_semver2()
}

impl PartialEq for NuGetVersion {
    fn eq(&self, other: &Self) -> bool {
        compare(self, other) == Ordering::Equal
    }
}

impl Eq for NuGetVersion {}

impl PartialOrd for NuGetVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for NuGetVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        compare(self, other)
    }
}

/// The string the version was parsed from, else the normalized form
impl fmt::Display for NuGetVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.original {
            Some(original) => f.write_str(original),
            None => f.write_str(&self.to_normalized_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn v(s: &str) -> NuGetVersion {
        NuGetVersion::parse(s).unwrap()
    }

    #[rstest]
    #[case("1", "1.0.0")]
    #[case("1.0", "1.0.0")]
    #[case("1.0.0.0", "1.0.0")]
    #[case("1.2.3.4", "1.2.3.4")]
    #[case("01.02.03", "1.2.3")]
    #[case("1.0.0-beta", "1.0.0-beta")]
    #[case("1.0.0-beta.1+build.5", "1.0.0-beta.1")]
    #[case("2.0-rc-1", "2.0.0-rc-1")]
    fn parse_normalizes(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(v(input).to_normalized_string(), expected);
    }

    #[rstest]
    #[case("")]
    #[case(" 1.0")]
    #[case("1.0.0.0.0")]
    #[case("1..0")]
    #[case("a.b")]
    #[case("1.0-")]
    #[case("1.0-beta..1")]
    #[case("1.0-beta_1")]
    #[case("1.0-01")]
    #[case("1.0+")]
    #[case("99999999999.0")]
    fn parse_rejects(#[case] input: &str) {
        assert!(NuGetVersion::parse(input).is_err(), "{input} should not parse");
    }

    #[rstest]
    #[case("1.0", "2.0.0-beta", Ordering::Less)]
    #[case("2.0", "1.0.0-beta", Ordering::Greater)]
    #[case("1", "1.0.0.0", Ordering::Equal)]
    #[case("1.0.0-alpha", "1.0.0", Ordering::Less)]
    #[case("1.0.0-alpha.2", "1.0.0-alpha.10", Ordering::Less)]
    #[case("1.0.0-BETA", "1.0.0-beta", Ordering::Equal)]
    #[case("1.0.0+a", "1.0.0+b", Ordering::Equal)]
    #[case("1.0.0.1", "1.0.0", Ordering::Greater)]
    fn compare_orders_versions(#[case] a: &str, #[case] b: &str, #[case] expected: Ordering) {
        assert_eq!(compare(&v(a), &v(b)), expected);
    }

    #[rstest]
    #[case("1.0.0", false)]
    #[case("1.0.0-beta", false)]
    #[case("1.0.0-beta.1", true)]
    #[case("1.0.0+meta", true)]
    fn is_semver2_cases(#[case] input: &str, #[case] expected: bool) {
        assert_eq!(v(input).is_semver2(), expected);
    }

    #[test]
    fn full_string_keeps_metadata_and_display_keeps_original() {
        let version = v("1.0-beta+git.abc");
        assert_eq!(version.to_full_string(), "1.0.0-beta+git.abc");
        assert_eq!(version.to_string(), "1.0-beta+git.abc");
        assert_eq!(NuGetVersion::new(1, 2, 3).to_string(), "1.2.3");
    }
}
