//! Package store test utilities

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tempfile::TempDir;

use nuget_sandbox::isolation::target::TargetSelector;
use nuget_sandbox::release::ReleaseId;
use nuget_sandbox::release::store::{ArtifactLocator, InstalledPackage, LocalPackageStore};
use nuget_sandbox::service::ToolsFactory;

pub fn release(version: &str) -> ReleaseId {
    ReleaseId::parse(version).unwrap()
}

/// Create a package store in a temp directory with the given (release, tfm) pairs installed
pub fn create_test_store(releases: &[(&str, &str)]) -> (TempDir, Arc<LocalPackageStore>) {
    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(LocalPackageStore::new(temp_dir.path()));
    for (version, tfm) in releases {
        store.install_release(&release(version), tfm).unwrap();
    }
    (temp_dir, store)
}

/// Create a factory over a fresh store, without feeds
pub fn create_test_factory(releases: &[(&str, &str)]) -> (TempDir, ToolsFactory) {
    let (temp_dir, store) = create_test_store(releases);
    let factory = ToolsFactory::new(store.clone(), store, TargetSelector::default(), Vec::new());
    (temp_dir, factory)
}

/// Locator that counts how often it is asked
pub struct CountingLocator {
    inner: Arc<LocalPackageStore>,
    calls: AtomicUsize,
}

impl CountingLocator {
    pub fn new(inner: Arc<LocalPackageStore>) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ArtifactLocator for CountingLocator {
    fn locate(&self, package_id: &str, release: &ReleaseId) -> InstalledPackage {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.locate(package_id, release)
    }
}
