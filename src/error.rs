use std::path::PathBuf;

use thiserror::Error;

use crate::isolation::context::ContextId;
use crate::release::ReleaseId;

/// Kind of logical entity a parse was attempted for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Framework,
    Version,
    VersionRange,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EntityKind::Framework => "framework",
            EntityKind::Version => "version",
            EntityKind::VersionRange => "version range",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("'{input}' is not a valid {kind}: {reason}")]
pub struct ParseError {
    pub kind: EntityKind,
    pub input: String,
    pub reason: String,
}

impl ParseError {
    pub fn new(kind: EntityKind, input: &str, reason: impl Into<String>) -> Self {
        Self {
            kind,
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Package {package} {release} is not installed (missing {marker:?})")]
    PackageNotInstalled {
        package: String,
        release: ReleaseId,
        marker: PathBuf,
    },

    #[error("No compatible runtime target for {package} {release} (available: {available:?})")]
    NoCompatibleTarget {
        package: String,
        release: ReleaseId,
        available: Vec<String>,
    },

    #[error("Release {release} does not provide assembly {assembly}")]
    MissingAssembly { release: ReleaseId, assembly: String },

    #[error("Invalid module {path:?}: {reason}")]
    InvalidModule { path: PathBuf, reason: String },

    #[error("Module {path:?} was built for {found}, expected {release}")]
    VersionMismatch {
        path: PathBuf,
        release: ReleaseId,
        found: String,
    },

    #[error("No adapter line supports release {0}")]
    UnsupportedLine(ReleaseId),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum SandboxError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Failed to build context: {0}")]
    Build(#[from] BuildError),

    #[error(transparent)]
    Feed(#[from] FeedError),

    #[error("{capability} is not supported by release {release}")]
    Unsupported {
        release: ReleaseId,
        capability: &'static str,
    },

    #[error("Entity from context {actual} passed to adapter bound to context {expected}")]
    ContextMismatch {
        expected: ContextId,
        actual: ContextId,
    },

    #[error("Entity value is not a {0} of the bound release")]
    ForeignValue(&'static str),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Context build task failed: {0}")]
    BuildTaskFailed(String),
}

#[derive(Debug, Error)]
pub enum MaterializeError {
    #[error("IO error reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid package layout: {0}")]
    InvalidLayout(String),
}

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Package not found: {0}")]
    NotFound(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
