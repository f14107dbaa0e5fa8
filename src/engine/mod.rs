//! Compiled-in generations of the wrapped NuGet client library
//!
//! Each generation is what a loaded module of that API family exposes. The binder
//! never calls into these modules directly: it reaches them through the member
//! table of a [`LoadedModule`](crate::isolation::context::LoadedModule), so which
//! operations exist depends on the release that was loaded.
//!
//! - [`legacy`]: the 2.x `NuGet.Core` API
//! - [`modern`]: the 3.x+ `NuGet.Frameworks` / `NuGet.Versioning` API

pub mod legacy;
pub mod modern;

use std::any::Any;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::release::{ReleaseGroup, ReleaseId};

/// Type-erased member of a loaded module (a function pointer or API object)
pub type Member = Arc<dyn Any + Send + Sync>;

/// Named member as published by a module
pub type Export = (&'static str, Member);

/// Publish `value` under `name`. The concrete type is the member's signature:
/// lookups must name the same type to find it.
pub fn export<T: Any + Send + Sync>(name: &'static str, value: T) -> Export {
    (name, Arc::new(value))
}

/// Members a module of `assembly` exposes when built for `release`. None when the
/// release's generation has no such assembly.
pub fn exports(assembly: &str, release: &ReleaseId) -> Option<Vec<Export>> {
    match release.group() {
        ReleaseGroup::Legacy => legacy::exports(assembly, release),
        ReleaseGroup::Modern => modern::exports(assembly, release),
    }
}

/// Failure raised inside an engine; adapters turn it into a `ParseError`
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct EngineError(pub String);

impl EngineError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Four-component numeric version as used by framework names (`4.5.1.0`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DottedVersion {
    pub major: u32,
    pub minor: u32,
    pub build: u32,
    pub revision: u32,
}

impl DottedVersion {
    /// Upper sentinel meaning "unbounded above"
    pub const MAX: DottedVersion = DottedVersion {
        major: i32::MAX as u32,
        minor: 0,
        build: 0,
        revision: 0,
    };

    pub const fn new(major: u32, minor: u32, build: u32, revision: u32) -> Self {
        Self {
            major,
            minor,
            build,
            revision,
        }
    }

    pub const fn of(major: u32, minor: u32) -> Self {
        Self::new(major, minor, 0, 0)
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }

    pub fn parts(&self) -> [u32; 4] {
        [self.major, self.minor, self.build, self.revision]
    }

    /// Parse `4.5`, `4.5.1` or `4.5.1.0`; each component must fit an i32
    pub fn parse_dotted(input: &str) -> Option<Self> {
        let parts: Vec<&str> = input.split('.').collect();
        if parts.is_empty() || parts.len() > 4 {
            return None;
        }

        let mut values = [0u32; 4];
        for (i, part) in parts.iter().enumerate() {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            let value: i32 = part.parse().ok()?;
            values[i] = value as u32;
        }

        Some(Self::new(values[0], values[1], values[2], values[3]))
    }

    /// Parse the compact folder form where every digit is a component (`451` -> 4.5.1)
    pub fn parse_compact(input: &str) -> Option<Self> {
        if input.is_empty() || input.len() > 4 || !input.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        let mut values = [0u32; 4];
        for (i, digit) in input.bytes().enumerate() {
            values[i] = (digit - b'0') as u32;
        }

        Some(Self::new(values[0], values[1], values[2], values[3]))
    }

    /// `major.minor`, plus build and revision only when they are non-zero
    pub fn display_short(&self) -> String {
        let mut s = format!("{}.{}", self.major, self.minor);
        if self.build > 0 || self.revision > 0 {
            s.push_str(&format!(".{}", self.build));
        }
        if self.revision > 0 {
            s.push_str(&format!(".{}", self.revision));
        }
        s
    }

    /// Digits concatenated with trailing zero components dropped (`4.5.0.0` -> `45`).
    /// Returns None when any component has more than one digit.
    pub fn display_compact(&self) -> Option<String> {
        self.concat_digits(2)
    }

    /// Like [`display_compact`](Self::display_compact) but trims down to the major
    /// digit (`8.0` -> `8`, `8.1` -> `81`).
    pub fn display_single_digit(&self) -> Option<String> {
        self.concat_digits(1)
    }

    fn concat_digits(&self, keep: usize) -> Option<String> {
        let parts = self.parts();
        if parts.iter().any(|p| *p > 9) {
            return None;
        }

        let mut len = 4;
        while len > keep && parts[len - 1] == 0 {
            len -= 1;
        }

        Some(parts[..len].iter().map(|p| p.to_string()).collect())
    }
}

impl fmt::Display for DottedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.build, self.revision
        )
    }
}

impl PartialOrd for DottedVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DottedVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.parts().cmp(&other.parts())
    }
}

/// Compare two prerelease label lists with SemVer 2.0 precedence.
///
/// Numeric labels compare numerically and sort before alphanumeric ones; alphanumeric
/// labels compare case-insensitively; a shorter list that is a prefix sorts first.
pub fn compare_release_labels(a: &[String], b: &[String]) -> Ordering {
    for (x, y) in a.iter().zip(b.iter()) {
        let ordering = match (x.parse::<u64>(), y.parse::<u64>()) {
            (Ok(x), Ok(y)) => x.cmp(&y),
            (Ok(_), Err(_)) => Ordering::Less,
            (Err(_), Ok(_)) => Ordering::Greater,
            (Err(_), Err(_)) => x.to_ascii_lowercase().cmp(&y.to_ascii_lowercase()),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    a.len().cmp(&b.len())
}
