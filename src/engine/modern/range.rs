//! `VersionRange` and floating ranges
//!
//! Accepted forms:
//!
//! ```text
//! 1.0                 >= 1.0.0
//! [1.0]               == 1.0.0
//! [1.0, 2.0)          >= 1.0.0 && < 2.0.0
//! (, 2.0]             <= 2.0.0
//! 1.0.*  1.*  *       floating numeric part
//! 1.0.0-*  1.0.0-rc*  floating release label
//! *-*  1.*-*          floating numeric part including prereleases
//! ```

use std::cmp::Ordering;
use std::fmt;

use crate::engine::EngineError;
use crate::engine::modern::version::{NuGetVersion, compare};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloatBehavior {
    Prerelease,
    Revision,
    Patch,
    Minor,
    Major,
    PrereleaseRevision,
    PrereleasePatch,
    PrereleaseMinor,
    AbsoluteLatest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FloatRange {
    behavior: FloatBehavior,
    min_version: NuGetVersion,
    release_prefix: String,
}

impl FloatRange {
    pub fn behavior(&self) -> FloatBehavior {
        self.behavior
    }

    pub fn min_version(&self) -> &NuGetVersion {
        &self.min_version
    }

    pub fn parse(input: &str) -> Result<Self, EngineError> {
        let invalid = || EngineError::new(format!("'{}' is not a valid floating version", input));

        if input == "*" {
            return Ok(Self {
                behavior: FloatBehavior::Major,
                min_version: NuGetVersion::new(0, 0, 0),
                release_prefix: String::new(),
            });
        }
        if input == "*-*" {
            return Ok(Self {
                behavior: FloatBehavior::AbsoluteLatest,
                min_version: NuGetVersion::new(0, 0, 0).with_release("0"),
                release_prefix: String::new(),
            });
        }

        match input.split_once('-') {
            Some((numbers, release)) => {
                let Some(prefix) = release.strip_suffix('*') else {
                    return Err(invalid());
                };
                if prefix.contains('*') {
                    return Err(invalid());
                }
                let label = if prefix.is_empty() { "0" } else { prefix.trim_end_matches('.') };

                match numbers.strip_suffix(".*") {
                    Some(fixed) => {
                        if !prefix.is_empty() {
                            return Err(invalid());
                        }
                        let behavior = match fixed.split('.').count() {
                            1 => FloatBehavior::PrereleaseMinor,
                            2 => FloatBehavior::PrereleasePatch,
                            3 => FloatBehavior::PrereleaseRevision,
                            _ => return Err(invalid()),
                        };
                        let min = NuGetVersion::parse(fixed).map_err(|_| invalid())?;
                        Ok(Self {
                            behavior,
                            min_version: NuGetVersion::parse(&format!(
                                "{}-0",
                                min.to_normalized_string()
                            ))
                            .map_err(|_| invalid())?,
                            release_prefix: String::new(),
                        })
                    }
                    None => {
                        let min = NuGetVersion::parse(&format!("{}-{}", numbers, label))
                            .map_err(|_| invalid())?;
                        Ok(Self {
                            behavior: FloatBehavior::Prerelease,
                            min_version: min,
                            release_prefix: prefix.to_string(),
                        })
                    }
                }
            }
            None => {
                let Some(fixed) = input.strip_suffix(".*") else {
                    return Err(invalid());
                };
                let behavior = match fixed.split('.').count() {
                    1 => FloatBehavior::Minor,
                    2 => FloatBehavior::Patch,
                    3 => FloatBehavior::Revision,
                    _ => return Err(invalid()),
                };
                let min = NuGetVersion::parse(fixed).map_err(|_| invalid())?;
                Ok(Self {
                    behavior,
                    min_version: NuGetVersion::parse(&min.to_normalized_string())
                        .map_err(|_| invalid())?,
                    release_prefix: String::new(),
                })
            }
        }
    }

    fn numeric_prefix_matches(&self, version: &NuGetVersion, parts: usize) -> bool {
        self.min_version.numeric()[..parts] == version.numeric()[..parts]
    }

    fn release_matches(&self, version: &NuGetVersion) -> bool {
        !version.is_prerelease()
            || version
                .release()
                .to_ascii_lowercase()
                .starts_with(&self.release_prefix.to_ascii_lowercase())
    }

    /// True when `version` is within the floating part of this range
    pub fn satisfies(&self, version: &NuGetVersion) -> bool {
        match self.behavior {
            FloatBehavior::AbsoluteLatest => true,
            FloatBehavior::Major => !version.is_prerelease(),
            FloatBehavior::Minor => !version.is_prerelease() && self.numeric_prefix_matches(version, 1),
            FloatBehavior::Patch => !version.is_prerelease() && self.numeric_prefix_matches(version, 2),
            FloatBehavior::Revision => {
                !version.is_prerelease() && self.numeric_prefix_matches(version, 3)
            }
            FloatBehavior::Prerelease => {
                self.numeric_prefix_matches(version, 4) && self.release_matches(version)
            }
            FloatBehavior::PrereleaseMinor => self.numeric_prefix_matches(version, 1),
            FloatBehavior::PrereleasePatch => self.numeric_prefix_matches(version, 2),
            FloatBehavior::PrereleaseRevision => self.numeric_prefix_matches(version, 3),
        }
    }
}

impl fmt::Display for FloatRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let min = &self.min_version;
        match self.behavior {
            FloatBehavior::AbsoluteLatest => f.write_str("*-*"),
            FloatBehavior::Major => f.write_str("*"),
            FloatBehavior::Minor => write!(f, "{}.*", min.major()),
            FloatBehavior::Patch => write!(f, "{}.{}.*", min.major(), min.minor()),
            FloatBehavior::Revision => {
                write!(f, "{}.{}.{}.*", min.major(), min.minor(), min.patch())
            }
            FloatBehavior::PrereleaseMinor => write!(f, "{}.*-*", min.major()),
            FloatBehavior::PrereleasePatch => write!(f, "{}.{}.*-*", min.major(), min.minor()),
            FloatBehavior::PrereleaseRevision => {
                write!(f, "{}.{}.{}.*-*", min.major(), min.minor(), min.patch())
            }
            FloatBehavior::Prerelease => {
                let mut numbers = format!("{}.{}.{}", min.major(), min.minor(), min.patch());
                if min.revision() > 0 {
                    numbers.push_str(&format!(".{}", min.revision()));
                }
                write!(f, "{}-{}*", numbers, self.release_prefix)
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct VersionRange {
    min: Option<NuGetVersion>,
    min_inclusive: bool,
    max: Option<NuGetVersion>,
    max_inclusive: bool,
    float: Option<FloatRange>,
    original: Option<String>,
}

impl VersionRange {
    pub fn new(
        min: Option<NuGetVersion>,
        min_inclusive: bool,
        max: Option<NuGetVersion>,
        max_inclusive: bool,
    ) -> Self {
        Self {
            min,
            min_inclusive,
            max,
            max_inclusive,
            float: None,
            original: None,
        }
    }

    pub fn min_version(&self) -> Option<&NuGetVersion> {
        self.min.as_ref()
    }

    pub fn max_version(&self) -> Option<&NuGetVersion> {
        self.max.as_ref()
    }

    pub fn has_lower_bound(&self) -> bool {
        self.min.is_some()
    }

    pub fn has_upper_bound(&self) -> bool {
        self.max.is_some()
    }

    pub fn is_min_inclusive(&self) -> bool {
        self.has_lower_bound() && self.min_inclusive
    }

    pub fn is_max_inclusive(&self) -> bool {
        self.has_upper_bound() && self.max_inclusive
    }

    pub fn is_floating(&self) -> bool {
        self.float.is_some()
    }

    pub fn float_range(&self) -> Option<&FloatRange> {
        self.float.as_ref()
    }

    pub fn original_string(&self) -> Option<&str> {
        self.original.as_deref()
    }

    fn is_exact(&self) -> bool {
        match (&self.min, &self.max) {
            (Some(min), Some(max)) => self.min_inclusive && self.max_inclusive && min == max,
            _ => false,
        }
    }

    pub fn parse(input: &str) -> Result<Self, EngineError> {
        let invalid = |reason: &str| {
            EngineError::new(format!("'{}' is not a valid version range: {}", input, reason))
        };

        let value = input.trim();
        if value.is_empty() {
            return Err(EngineError::new("Version range cannot be empty"));
        }

        let mut range = if value.starts_with('[') || value.starts_with('(') {
            Self::parse_bracketed(value).map_err(|reason| invalid(&reason))?
        } else if value.contains('*') {
            let float = FloatRange::parse(value)?;
            Self {
                min: Some(float.min_version().clone()),
                min_inclusive: true,
                max: None,
                max_inclusive: false,
                float: Some(float),
                original: None,
            }
        } else {
            let min = NuGetVersion::parse(value).map_err(|e| invalid(&e.to_string()))?;
            Self::new(Some(min), true, None, false)
        };

        range.original = Some(input.to_string());
        Ok(range)
    }

    fn parse_bracketed(value: &str) -> Result<Self, String> {
        let min_inclusive = value.starts_with('[');
        let max_inclusive = match value.chars().last() {
            Some(']') => true,
            Some(')') => false,
            _ => return Err("missing closing bracket".to_string()),
        };
        if value.len() < 2 {
            return Err("missing closing bracket".to_string());
        }
        let inner = &value[1..value.len() - 1];

        let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
        match parts.as_slice() {
            [single] => {
                if !(min_inclusive && max_inclusive) {
                    return Err("an exact version must use [ and ]".to_string());
                }
                let version = NuGetVersion::parse(single).map_err(|e| e.to_string())?;
                Ok(Self::new(Some(version.clone()), true, Some(version), true))
            }
            [min, max] => {
                if min.is_empty() && max.is_empty() {
                    return Err("at least one bound is required".to_string());
                }

                let mut float = None;
                let min_version = if min.is_empty() {
                    None
                } else if min.contains('*') {
                    let parsed = FloatRange::parse(min).map_err(|e| e.to_string())?;
                    let version = parsed.min_version().clone();
                    float = Some(parsed);
                    Some(version)
                } else {
                    Some(NuGetVersion::parse(min).map_err(|e| e.to_string())?)
                };

                let max_version = if max.is_empty() {
                    None
                } else {
                    Some(NuGetVersion::parse(max).map_err(|e| e.to_string())?)
                };

                if let (Some(min), Some(max)) = (&min_version, &max_version) {
                    if compare(min, max) == Ordering::Greater {
                        return Err("the lower bound is above the upper bound".to_string());
                    }
                }

                Ok(Self {
                    min: min_version,
                    min_inclusive,
                    max: max_version,
                    max_inclusive,
                    float,
                    original: None,
                })
            }
            _ => Err("too many bounds".to_string()),
        }
    }

    /// Bounds check only; floating ranges are checked against their lower bound
    pub fn satisfies(&self, version: &NuGetVersion) -> bool {
        if let Some(min) = &self.min {
            match compare(version, min) {
                Ordering::Less => return false,
                Ordering::Equal if !self.min_inclusive => return false,
                _ => {}
            }
        }
        if let Some(max) = &self.max {
            match compare(version, max) {
                Ordering::Greater => return false,
                Ordering::Equal if !self.max_inclusive => return false,
                _ => {}
            }
        }
        true
    }

    /// True when `considering` should replace `current` as the best match.
    ///
    /// Non-floating ranges prefer the lowest satisfying version. Floating ranges
    /// prefer versions inside the float, and the highest among those.
    pub fn is_better(&self, current: Option<&NuGetVersion>, considering: &NuGetVersion) -> bool {
        if !self.satisfies(considering) {
            return false;
        }
        let Some(current) = current else {
            return true;
        };
        if current == considering {
            return false;
        }

        match &self.float {
            Some(float) => {
                let current_in_float = float.satisfies(current);
                let considering_in_float = float.satisfies(considering);
                match (current_in_float, considering_in_float) {
                    (true, false) => false,
                    (false, true) => true,
                    (true, true) => compare(considering, current) == Ordering::Greater,
                    (false, false) => compare(considering, current) == Ordering::Less,
                }
            }
            None => compare(current, considering) == Ordering::Greater,
        }
    }

    pub fn find_best_match<'a>(
        &self,
        versions: impl IntoIterator<Item = &'a NuGetVersion>,
    ) -> Option<NuGetVersion> {
        let mut best: Option<&NuGetVersion> = None;
        for version in versions {
            if self.is_better(best, version) {
                best = Some(version);
            }
        }
        best.cloned()
    }

    fn format_bounds(&self, min: Option<String>) -> String {
        let mut s = String::new();
        s.push(if self.min_inclusive && self.min.is_some() { '[' } else { '(' });
        if let Some(min) = min {
            s.push_str(&min);
        }
        s.push_str(", ");
        if let Some(max) = &self.max {
            s.push_str(&max.to_normalized_string());
        }
        s.push(if self.max_inclusive && self.max.is_some() { ']' } else { ')' });
        s
    }

    /// `[1.0.0, 2.0.0)`; floating lower bounds keep their float form (`[1.0.*, )`)
    pub fn to_normalized_string(&self) -> String {
        if let (true, Some(min)) = (self.is_exact(), &self.min) {
            return format!("[{}]", min.to_normalized_string());
        }
        let min = match (&self.float, &self.min) {
            (Some(float), _) => Some(float.to_string()),
            (None, Some(min)) => Some(min.to_normalized_string()),
            (None, None) => None,
        };
        self.format_bounds(min)
    }

    /// Bracketed form with the float's lower bound written as a plain version
    pub fn to_legacy_string(&self) -> String {
        if let (true, Some(min)) = (self.is_exact(), &self.min) {
            return format!("[{}]", min.to_normalized_string());
        }
        self.format_bounds(self.min.as_ref().map(NuGetVersion::to_normalized_string))
    }

    /// A bare version for plain minimum ranges, else the legacy string
    pub fn to_legacy_short_string(&self) -> String {
        match (&self.min, &self.max) {
            (Some(min), None) if self.min_inclusive && !self.is_floating() => {
                min.to_normalized_string()
            }
            _ => self.to_legacy_string(),
        }
    }

    /// `(>= 1.0.0 && < 2.0.0)`, `(= 1.0.0)`; empty for an unbounded range
    pub fn pretty_print(&self) -> String {
        if let (true, Some(min)) = (self.is_exact(), &self.min) {
            return format!("(= {})", min.to_normalized_string());
        }

        let mut parts = Vec::new();
        if let Some(min) = &self.min {
            let op = if self.min_inclusive { ">=" } else { ">" };
            parts.push(format!("{} {}", op, min.to_normalized_string()));
        }
        if let Some(max) = &self.max {
            let op = if self.max_inclusive { "<=" } else { "<" };
            parts.push(format!("{} {}", op, max.to_normalized_string()));
        }

        if parts.is_empty() {
            String::new()
        } else {
            format!("({})", parts.join(" && "))
        }
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_normalized_string())
    }
}

pub fn parse(input: &str) -> Result<VersionRange, EngineError> {
    VersionRange::parse(input)
}

pub fn satisfies(range: &VersionRange, version: &NuGetVersion) -> bool {
    range.satisfies(version)
}

pub fn is_better(range: &VersionRange, current: &NuGetVersion, considering: &NuGetVersion) -> bool {
    range.is_better(Some(current), considering)
}

pub fn find_best_match(range: &VersionRange, versions: &[NuGetVersion]) -> Option<NuGetVersion> {
    range.find_best_match(versions)
}

pub fn is_floating(range: &VersionRange) -> bool {
    range.is_floating()
}

pub fn to_normalized_string(range: &VersionRange) -> String {
    range.to_normalized_string()
}

pub fn to_string(range: &VersionRange) -> String {
    range.to_string()
}

pub fn pretty_print(range: &VersionRange) -> String {
    range.pretty_print()
}

pub fn to_legacy_string(range: &VersionRange) -> String {
    range.to_legacy_string()
}

pub fn to_legacy_short_string(range: &VersionRange) -> String {
    range.to_legacy_short_string()
}

pub fn original_string(range: &VersionRange) -> Option<String> {
    range.original_string().map(str::to_string)
}
