//! Package file manifest and module descriptors
//!
//! An installed package lists its binaries as `lib/<tfm>/<Assembly>.dll`. Each
//! binary is a JSON module descriptor naming the assembly, the release it was
//! built for and, optionally, the members it exports.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::BuildError;
use crate::release::ReleaseId;

const MODULE_EXTENSION: &str = "dll";

/// Content of one binary artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    pub assembly: String,
    pub version: String,
    /// Member names to publish; every member of the release when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exports: Option<Vec<String>>,
}

impl ModuleDescriptor {
    pub fn new(assembly: &str, release: &ReleaseId) -> Self {
        Self {
            assembly: assembly.to_string(),
            version: release.to_string(),
            exports: None,
        }
    }

    pub fn with_exports<I, S>(mut self, exports: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exports = Some(exports.into_iter().map(Into::into).collect());
        self
    }

    pub async fn read(path: &Path) -> Result<Self, BuildError> {
        let content = tokio::fs::read(path).await?;
        serde_json::from_slice(&content).map_err(|e| BuildError::InvalidModule {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// True when `name` passes the export filter
    pub fn exports_member(&self, name: &str) -> bool {
        match &self.exports {
            Some(exports) => exports.iter().any(|e| e == name),
            None => true,
        }
    }
}

/// Binaries compiled for one target framework
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibGroup {
    pub target_framework: String,
    pub files: Vec<PathBuf>,
}

impl LibGroup {
    /// File implementing `assembly`, matched case-insensitively on the file stem
    pub fn assembly_path(&self, assembly: &str) -> Option<&Path> {
        self.files
            .iter()
            .find(|file| {
                file.file_stem()
                    .is_some_and(|stem| stem.to_string_lossy().eq_ignore_ascii_case(assembly))
            })
            .map(PathBuf::as_path)
    }
}

/// Lib groups of an installed package
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageManifest {
    pub lib_groups: Vec<LibGroup>,
}

impl PackageManifest {
    /// List `lib/<tfm>/*.dll` below `install_path`. A package without a `lib`
    /// folder has an empty manifest.
    pub async fn read(install_path: &Path) -> Result<Self, BuildError> {
        let lib_dir = install_path.join("lib");
        let mut lib_groups = Vec::new();

        let mut groups = match tokio::fs::read_dir(&lib_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No lib folder in {:?}", install_path);
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };

        while let Some(group) = groups.next_entry().await? {
            if !group.file_type().await?.is_dir() {
                warn!("Ignoring stray file {:?} in lib folder", group.path());
                continue;
            }

            let mut files = Vec::new();
            let mut entries = tokio::fs::read_dir(group.path()).await?;
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case(MODULE_EXTENSION))
                {
                    files.push(path);
                }
            }
            files.sort();

            lib_groups.push(LibGroup {
                target_framework: group.file_name().to_string_lossy().into_owned(),
                files,
            });
        }

        lib_groups.sort_by(|a, b| a.target_framework.cmp(&b.target_framework));
        Ok(Self { lib_groups })
    }

    pub fn target_frameworks(&self) -> Vec<String> {
        self.lib_groups
            .iter()
            .map(|group| group.target_framework.clone())
            .collect()
    }
}
