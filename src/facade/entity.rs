//! Logical entities
//!
//! Each entity wraps one engine value produced inside an isolation context,
//! together with a snapshot of its logical surface taken when it was created.
//! Optional members are `None` when the bound release does not offer them;
//! reading one anyway is an [`SandboxError::Unsupported`] error.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use serde::{Serialize, Serializer};

use crate::engine::DottedVersion;
use crate::error::SandboxError;
use crate::isolation::ContextId;
use crate::release::ReleaseId;

/// Engine value carried by an entity
pub(crate) type Inner = Arc<dyn Any + Send + Sync>;

/// Context and release an entity was produced by
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Origin {
    pub context: ContextId,
    pub release: ReleaseId,
}

impl Origin {
    fn unsupported(&self, capability: &'static str) -> SandboxError {
        SandboxError::Unsupported {
            release: self.release.clone(),
            capability,
        }
    }
}

/// Access to the wrapped engine value, for adapters
pub(crate) trait Wrapped {
    const KIND: &'static str;

    fn origin(&self) -> &Origin;

    fn inner(&self) -> &Inner;
}

fn serialize_display<T: fmt::Display, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

fn serialize_optional_display<T: fmt::Display, S: Serializer>(
    value: &Option<T>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(value) => serializer.collect_str(value),
        None => serializer.serialize_none(),
    }
}

#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Framework {
    #[serde(skip)]
    pub(crate) origin: Origin,
    #[serde(skip)]
    pub(crate) inner: Inner,
    pub(crate) identifier: String,
    #[serde(serialize_with = "serialize_display")]
    pub(crate) version: DottedVersion,
    pub(crate) profile: String,
    pub(crate) has_profile: bool,
    pub(crate) short_folder_name: String,
    pub(crate) dotnet_framework_name: String,
    pub(crate) has_platform: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) platform: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_optional_display"
    )]
    pub(crate) platform_version: Option<DottedVersion>,
    pub(crate) to_string_result: String,
}

impl Framework {
    pub fn context(&self) -> ContextId {
        self.origin.context
    }

    pub fn release(&self) -> &ReleaseId {
        &self.origin.release
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

    pub fn has_profile(&self) -> bool {
        self.has_profile
    }

    pub fn short_folder_name(&self) -> &str {
        &self.short_folder_name
    }

    pub fn dotnet_framework_name(&self) -> &str {
        &self.dotnet_framework_name
    }

    pub fn has_platform(&self) -> bool {
        self.has_platform
    }

    pub fn platform_available(&self) -> bool {
        self.platform.is_some()
    }

    pub fn platform(&self) -> Result<&str, SandboxError> {
        self.platform
            .as_deref()
            .ok_or_else(|| self.origin.unsupported("Platform"))
    }

    pub fn platform_version(&self) -> Result<DottedVersion, SandboxError> {
        self.platform_version
            .ok_or_else(|| self.origin.unsupported("PlatformVersion"))
    }

    pub fn to_string_result(&self) -> &str {
        &self.to_string_result
    }

    /// Canonical names match, ignoring case
    pub fn same_name(&self, other: &Framework) -> bool {
        self.dotnet_framework_name
            .eq_ignore_ascii_case(&other.dotnet_framework_name)
    }
}

impl Wrapped for Framework {
    const KIND: &'static str = "framework";

    fn origin(&self) -> &Origin {
        &self.origin
    }

    fn inner(&self) -> &Inner {
        &self.inner
    }
}

impl fmt::Debug for Framework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Framework")
            .field("context", &self.origin.context)
            .field("dotnet_framework_name", &self.dotnet_framework_name)
            .field("short_folder_name", &self.short_folder_name)
            .finish()
    }
}

impl fmt::Display for Framework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.short_folder_name)
    }
}

#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Version {
    #[serde(skip)]
    pub(crate) origin: Origin,
    #[serde(skip)]
    pub(crate) inner: Inner,
    pub(crate) major: u64,
    pub(crate) minor: u64,
    pub(crate) patch: u64,
    pub(crate) revision: u64,
    pub(crate) is_prerelease: bool,
    pub(crate) normalized_string: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) full_string: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) is_semver2: Option<bool>,
    pub(crate) to_string_result: String,
}

impl Version {
    pub fn context(&self) -> ContextId {
        self.origin.context
    }

    pub fn release(&self) -> &ReleaseId {
        &self.origin.release
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

    pub fn is_prerelease(&self) -> bool {
        self.is_prerelease
    }

    pub fn normalized_string(&self) -> &str {
        &self.normalized_string
    }

    pub fn full_string_available(&self) -> bool {
        self.full_string.is_some()
    }

    pub fn full_string(&self) -> Result<&str, SandboxError> {
        self.full_string
            .as_deref()
            .ok_or_else(|| self.origin.unsupported("FullString"))
    }

    pub fn is_semver2_available(&self) -> bool {
        self.is_semver2.is_some()
    }

    pub fn is_semver2(&self) -> Result<bool, SandboxError> {
        self.is_semver2
            .ok_or_else(|| self.origin.unsupported("IsSemVer2"))
    }

    pub fn to_string_result(&self) -> &str {
        &self.to_string_result
    }
}

impl Wrapped for Version {
    const KIND: &'static str = "version";

    fn origin(&self) -> &Origin {
        &self.origin
    }

    fn inner(&self) -> &Inner {
        &self.inner
    }
}

impl fmt::Debug for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Version")
            .field("context", &self.origin.context)
            .field("normalized_string", &self.normalized_string)
            .finish()
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_result)
    }
}

#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionRange {
    #[serde(skip)]
    pub(crate) origin: Origin,
    #[serde(skip)]
    pub(crate) inner: Inner,
    pub(crate) has_lower_bound: bool,
    pub(crate) has_upper_bound: bool,
    pub(crate) is_min_inclusive: bool,
    pub(crate) is_max_inclusive: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) is_floating: Option<bool>,
    pub(crate) min_version: Option<Version>,
    pub(crate) max_version: Option<Version>,
    pub(crate) normalized_string: String,
    pub(crate) pretty_print: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) legacy_short_string: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) legacy_string: Option<String>,
    /// Outer None: unavailable. Inner None: the range was not parsed from a string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) original_string: Option<Option<String>>,
}

impl VersionRange {
    pub fn context(&self) -> ContextId {
        self.origin.context
    }

    pub fn release(&self) -> &ReleaseId {
        &self.origin.release
    }

    pub fn has_lower_bound(&self) -> bool {
        self.has_lower_bound
    }

    pub fn has_upper_bound(&self) -> bool {
        self.has_upper_bound
    }

    pub fn is_min_inclusive(&self) -> bool {
        self.is_min_inclusive
    }

    pub fn is_max_inclusive(&self) -> bool {
        self.is_max_inclusive
    }

    pub fn is_floating_available(&self) -> bool {
        self.is_floating.is_some()
    }

    pub fn is_floating(&self) -> Result<bool, SandboxError> {
        self.is_floating
            .ok_or_else(|| self.origin.unsupported("IsFloating"))
    }

    pub fn min_version(&self) -> Option<&Version> {
        self.min_version.as_ref()
    }

    pub fn max_version(&self) -> Option<&Version> {
        self.max_version.as_ref()
    }

    pub fn normalized_string(&self) -> &str {
        &self.normalized_string
    }

    pub fn pretty_print(&self) -> &str {
        &self.pretty_print
    }

    pub fn legacy_short_string_available(&self) -> bool {
        self.legacy_short_string.is_some()
    }

    pub fn legacy_short_string(&self) -> Result<&str, SandboxError> {
        self.legacy_short_string
            .as_deref()
            .ok_or_else(|| self.origin.unsupported("LegacyShortString"))
    }

    pub fn legacy_string_available(&self) -> bool {
        self.legacy_string.is_some()
    }

    pub fn legacy_string(&self) -> Result<&str, SandboxError> {
        self.legacy_string
            .as_deref()
            .ok_or_else(|| self.origin.unsupported("LegacyString"))
    }

    pub fn original_string_available(&self) -> bool {
        self.original_string.is_some()
    }

    pub fn original_string(&self) -> Result<Option<&str>, SandboxError> {
        self.original_string
            .as_ref()
            .map(|original| original.as_deref())
            .ok_or_else(|| self.origin.unsupported("OriginalString"))
    }
}

impl Wrapped for VersionRange {
    const KIND: &'static str = "version range";

    fn origin(&self) -> &Origin {
        &self.origin
    }

    fn inner(&self) -> &Inner {
        &self.inner
    }
}

impl fmt::Debug for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VersionRange")
            .field("context", &self.origin.context)
            .field("normalized_string", &self.normalized_string)
            .finish()
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.normalized_string)
    }
}
