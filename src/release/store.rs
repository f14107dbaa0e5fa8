//! Local package folder
//!
//! Packages are laid out the way the NuGet global packages folder does it:
//!
//! ```text
//! <root>/<id-lowercase>/<version>/
//!     <id-lowercase>.<version>.nupkg.sha512   (presence marker)
//!     lib/<tfm>/<Assembly>.dll                (module descriptor)
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

#[cfg(test)]
use mockall::automock;
use tracing::{debug, warn};

use crate::error::MaterializeError;
use crate::isolation::manifest::ModuleDescriptor;
use crate::release::ReleaseId;

/// Source of locally materialized releases
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait PackageMaterializer: Send + Sync {
    /// Versions for which every package in `package_ids` has been downloaded
    async fn get_downloaded_versions(
        &self,
        package_ids: &[&'static str],
    ) -> Result<HashSet<ReleaseId>, MaterializeError>;
}

/// Location of one installed package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledPackage {
    pub package_id: String,
    pub release: ReleaseId,
    pub install_path: PathBuf,
    pub marker_path: PathBuf,
}

impl InstalledPackage {
    /// Absent marker means the package is not locally present
    pub fn is_present(&self) -> bool {
        self.marker_path.is_file()
    }
}

/// Resolves package identity to its on-disk location
#[cfg_attr(test, automock)]
pub trait ArtifactLocator: Send + Sync {
    fn locate(&self, package_id: &str, release: &ReleaseId) -> InstalledPackage;
}

#[derive(Debug, Clone)]
pub struct LocalPackageStore {
    root: PathBuf,
}

impl LocalPackageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn package_dir(&self, package_id: &str) -> PathBuf {
        self.root.join(package_id.to_lowercase())
    }

    fn marker_name(package_id: &str, release: &ReleaseId) -> String {
        format!("{}.{}.nupkg.sha512", package_id.to_lowercase(), release)
    }

    /// Write one module into the store and mark its package as present.
    ///
    /// Returns the path of the written module file.
    pub fn install_module(
        &self,
        package_id: &str,
        release: &ReleaseId,
        tfm: &str,
        descriptor: &ModuleDescriptor,
    ) -> Result<PathBuf, MaterializeError> {
        let installed = self.locate(package_id, release);
        let lib_dir = installed.install_path.join("lib").join(tfm);
        std::fs::create_dir_all(&lib_dir).map_err(|source| MaterializeError::Io {
            path: lib_dir.clone(),
            source,
        })?;

        let module_path = lib_dir.join(format!("{}.dll", descriptor.assembly));
        let content = serde_json::to_vec_pretty(descriptor)
            .map_err(|e| MaterializeError::InvalidLayout(e.to_string()))?;
        std::fs::write(&module_path, content).map_err(|source| MaterializeError::Io {
            path: module_path.clone(),
            source,
        })?;

        std::fs::write(&installed.marker_path, b"").map_err(|source| MaterializeError::Io {
            path: installed.marker_path.clone(),
            source,
        })?;

        debug!("Installed {} {} ({})", package_id, release, tfm);
        Ok(module_path)
    }

    /// Install every package of the release's group with full exports
    pub fn install_release(&self, release: &ReleaseId, tfm: &str) -> Result<(), MaterializeError> {
        for package_id in release.group().package_ids() {
            let descriptor = ModuleDescriptor::new(package_id, release);
            self.install_module(package_id, release, tfm, &descriptor)?;
        }
        Ok(())
    }

    async fn versions_of(&self, package_id: &str) -> Result<HashSet<ReleaseId>, MaterializeError> {
        let package_dir = self.package_dir(package_id);
        let mut versions = HashSet::new();

        let mut entries = match tokio::fs::read_dir(&package_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(versions),
            Err(source) => {
                return Err(MaterializeError::Io {
                    path: package_dir,
                    source,
                });
            }
        };

        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(source) => {
                    return Err(MaterializeError::Io {
                        path: package_dir,
                        source,
                    });
                }
            };

            let name = entry.file_name().to_string_lossy().into_owned();
            let Some(release) = ReleaseId::parse(&name) else {
                warn!("Skipping {:?}: not a version folder", entry.path());
                continue;
            };

            if self.locate(package_id, &release).is_present() {
                versions.insert(release);
            } else {
                debug!("Skipping {} {}: marker missing", package_id, release);
            }
        }

        Ok(versions)
    }
}

impl ArtifactLocator for LocalPackageStore {
    fn locate(&self, package_id: &str, release: &ReleaseId) -> InstalledPackage {
        let install_path = self.package_dir(package_id).join(release.to_string());
        let marker_path = install_path.join(Self::marker_name(package_id, release));
        InstalledPackage {
            package_id: package_id.to_string(),
            release: release.clone(),
            install_path,
            marker_path,
        }
    }
}

#[async_trait::async_trait]
impl PackageMaterializer for LocalPackageStore {
    async fn get_downloaded_versions(
        &self,
        package_ids: &[&'static str],
    ) -> Result<HashSet<ReleaseId>, MaterializeError> {
        let mut result: Option<HashSet<ReleaseId>> = None;

        for package_id in package_ids {
            let versions = self.versions_of(package_id).await?;
            result = Some(match result {
                None => versions,
                Some(previous) => previous.intersection(&versions).cloned().collect(),
            });
        }

        Ok(result.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::release::ReleaseGroup;
    use tempfile::TempDir;

    fn release(s: &str) -> ReleaseId {
        ReleaseId::parse(s).unwrap()
    }

    #[test]
    fn locate_uses_lowercase_id_and_marker_name() {
        let store = LocalPackageStore::new("/packages");

        let installed = store.locate("NuGet.Versioning", &release("4.3.0"));

        assert_eq!(
            installed.install_path,
            PathBuf::from("/packages/nuget.versioning/4.3.0")
        );
        assert_eq!(
            installed.marker_path,
            PathBuf::from("/packages/nuget.versioning/4.3.0/nuget.versioning.4.3.0.nupkg.sha512")
        );
        assert!(!installed.is_present());
    }

    #[tokio::test]
    async fn get_downloaded_versions_intersects_package_ids() {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalPackageStore::new(temp_dir.path());

        store.install_release(&release("4.3.0"), "net45").unwrap();
        store.install_release(&release("5.0.0"), "net45").unwrap();
        // Only half of the modern group for 3.5.0
        let descriptor = ModuleDescriptor::new("NuGet.Versioning", &release("3.5.0"));
        store
            .install_module("NuGet.Versioning", &release("3.5.0"), "net45", &descriptor)
            .unwrap();

        let versions = store
            .get_downloaded_versions(ReleaseGroup::Modern.package_ids())
            .await
            .unwrap();

        assert_eq!(
            versions,
            HashSet::from([release("4.3.0"), release("5.0.0")])
        );
    }

    #[tokio::test]
    async fn get_downloaded_versions_skips_folders_without_marker() {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalPackageStore::new(temp_dir.path());
        std::fs::create_dir_all(temp_dir.path().join("nuget.core/2.14.0/lib/net40-client"))
            .unwrap();
        std::fs::create_dir_all(temp_dir.path().join("nuget.core/not-a-version")).unwrap();
        store.install_release(&release("2.12.0"), "net40-client").unwrap();

        let versions = store
            .get_downloaded_versions(ReleaseGroup::Legacy.package_ids())
            .await
            .unwrap();

        assert_eq!(versions, HashSet::from([release("2.12.0")]));
    }

    #[tokio::test]
    async fn get_downloaded_versions_returns_empty_for_missing_root() {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalPackageStore::new(temp_dir.path().join("does-not-exist"));

        let versions = store
            .get_downloaded_versions(ReleaseGroup::Legacy.package_ids())
            .await
            .unwrap();

        assert!(versions.is_empty());
    }

    #[test]
    fn install_module_writes_descriptor_and_marker() {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalPackageStore::new(temp_dir.path());
        let descriptor = ModuleDescriptor::new("NuGet.Frameworks", &release("5.8.0"));

        let path = store
            .install_module("NuGet.Frameworks", &release("5.8.0"), "netstandard2.0", &descriptor)
            .unwrap();

        assert!(path.ends_with("nuget.frameworks/5.8.0/lib/netstandard2.0/NuGet.Frameworks.dll"));
        let written: ModuleDescriptor =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(written, descriptor);
        assert!(store.locate("NuGet.Frameworks", &release("5.8.0")).is_present());
    }
}
