//! Context cache
//!
//! One context per release, built at most once. Requesters for the same release
//! share a single in-flight build; different releases build concurrently.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::OnceCell;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{BuildError, SandboxError};
use crate::isolation::context::{AdapterLine, IsolationContext, LoadedModule};
use crate::isolation::manifest::PackageManifest;
use crate::isolation::target::TargetSelector;
use crate::release::ReleaseId;
use crate::release::store::ArtifactLocator;

type ContextCell = Arc<OnceCell<Arc<IsolationContext>>>;

pub struct ContextManager {
    locator: Arc<dyn ArtifactLocator>,
    selector: Arc<TargetSelector>,
    cache: DashMap<ReleaseId, ContextCell>,
}

impl ContextManager {
    pub fn new(locator: Arc<dyn ArtifactLocator>, selector: TargetSelector) -> Self {
        Self {
            locator,
            selector: Arc::new(selector),
            cache: DashMap::new(),
        }
    }

    /// Context for `release`, building it on first use.
    ///
    /// The build runs in its own task: a caller that goes away does not stop it,
    /// and the finished context is cached. A failed build leaves nothing behind,
    /// so the next call tries again.
    pub async fn get_or_create(
        &self,
        release: &ReleaseId,
    ) -> Result<Arc<IsolationContext>, SandboxError> {
        if let Some(context) = self.cached(release) {
            return Ok(context);
        }

        let cell = self.cache.entry(release.clone()).or_default().clone();
        let locator = Arc::clone(&self.locator);
        let selector = Arc::clone(&self.selector);
        let release = release.clone();

        let build = tokio::spawn(async move {
            cell.get_or_try_init(|| build_context(locator, selector, release))
                .await
                .cloned()
        });

        let context = build
            .await
            .map_err(|e| SandboxError::BuildTaskFailed(e.to_string()))??;
        Ok(context)
    }

    /// Like [`Self::get_or_create`], returning early when `cancel` fires. A build
    /// already under way keeps running and is cached when it completes.
    pub async fn get_or_create_with_cancel(
        &self,
        release: &ReleaseId,
        cancel: &CancellationToken,
    ) -> Result<Arc<IsolationContext>, SandboxError> {
        if cancel.is_cancelled() {
            return Err(SandboxError::Cancelled);
        }

        tokio::select! {
            _ = cancel.cancelled() => Err(SandboxError::Cancelled),
            result = self.get_or_create(release) => result,
        }
    }

    /// Already built context, without building
    pub fn cached(&self, release: &ReleaseId) -> Option<Arc<IsolationContext>> {
        self.cache
            .get(release)
            .and_then(|cell| cell.get().cloned())
    }

    pub fn cached_releases(&self) -> Vec<ReleaseId> {
        let mut releases: Vec<ReleaseId> = self
            .cache
            .iter()
            .filter(|entry| entry.value().initialized())
            .map(|entry| entry.key().clone())
            .collect();
        releases.sort();
        releases
    }
}

async fn build_context(
    locator: Arc<dyn ArtifactLocator>,
    selector: Arc<TargetSelector>,
    release: ReleaseId,
) -> Result<Arc<IsolationContext>, BuildError> {
    let line = AdapterLine::for_release(&release)?;
    info!("Building isolation context for {} ({})", release, line.as_str());

    let mut modules = Vec::new();
    let mut target_framework = None;

    for package_id in release.group().package_ids() {
        let installed = locator.locate(package_id, &release);
        if !installed.is_present() {
            warn!("{} {} is not installed", package_id, release);
            return Err(BuildError::PackageNotInstalled {
                package: package_id.to_string(),
                release: release.clone(),
                marker: installed.marker_path,
            });
        }

        let manifest = PackageManifest::read(&installed.install_path).await?;
        let group = selector
            .select(&manifest)
            .ok_or_else(|| BuildError::NoCompatibleTarget {
                package: package_id.to_string(),
                release: release.clone(),
                available: manifest.target_frameworks(),
            })?;

        let path = group
            .assembly_path(package_id)
            .ok_or_else(|| BuildError::MissingAssembly {
                release: release.clone(),
                assembly: package_id.to_string(),
            })?;

        modules.push(LoadedModule::load(path, package_id, &release).await?);
        target_framework.get_or_insert_with(|| group.target_framework.clone());
    }

    let context = IsolationContext::new(
        release,
        line,
        target_framework.unwrap_or_default(),
        modules,
    );
    debug!("Context {} ready for {}", context.id(), context.release());
    Ok(Arc::new(context))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::isolation::manifest::ModuleDescriptor;
    use crate::release::store::{InstalledPackage, LocalPackageStore};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    fn release(s: &str) -> ReleaseId {
        ReleaseId::parse(s).unwrap()
    }

    /// Store wrapper counting `locate` calls
    struct CountingLocator {
        store: LocalPackageStore,
        calls: AtomicUsize,
    }

    impl ArtifactLocator for CountingLocator {
        fn locate(&self, package_id: &str, release: &ReleaseId) -> InstalledPackage {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.store.locate(package_id, release)
        }
    }

    fn manager_for(temp_dir: &TempDir) -> (ContextManager, Arc<CountingLocator>) {
        let locator = Arc::new(CountingLocator {
            store: LocalPackageStore::new(temp_dir.path()),
            calls: AtomicUsize::new(0),
        });
        let manager = ContextManager::new(locator.clone(), TargetSelector::default());
        (manager, locator)
    }

    #[tokio::test]
    async fn concurrent_requests_share_one_build() {
        let temp_dir = TempDir::new().unwrap();
        LocalPackageStore::new(temp_dir.path())
            .install_release(&release("4.3.0"), "net45")
            .unwrap();
        let (manager, locator) = manager_for(&temp_dir);
        let manager = Arc::new(manager);

        let requests = (0..16).map(|_| {
            let manager = Arc::clone(&manager);
            async move { manager.get_or_create(&release("4.3.0")).await }
        });
        let contexts: Vec<Arc<IsolationContext>> = futures::future::join_all(requests)
            .await
            .into_iter()
            .map(Result::unwrap)
            .collect();

        // One build locates each of the two modern packages once
        assert_eq!(locator.calls.load(Ordering::SeqCst), 2);
        assert!(contexts.iter().all(|c| Arc::ptr_eq(c, &contexts[0])));
        assert_eq!(contexts[0].target_framework(), "net45");
        assert_eq!(manager.cached_releases(), vec![release("4.3.0")]);
    }

    #[tokio::test]
    async fn different_releases_get_different_contexts() {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalPackageStore::new(temp_dir.path());
        store.install_release(&release("2.14.0"), "net40-client").unwrap();
        store.install_release(&release("5.8.0"), "netstandard2.0").unwrap();
        let (manager, _) = manager_for(&temp_dir);

        let legacy = manager.get_or_create(&release("2.14.0")).await.unwrap();
        let modern = manager.get_or_create(&release("5.8.0")).await.unwrap();

        assert_ne!(legacy.id(), modern.id());
        assert_eq!(legacy.line(), AdapterLine::V2);
        assert_eq!(modern.line(), AdapterLine::V5);
        assert_eq!(legacy.modules().len(), 1);
        assert_eq!(modern.modules().len(), 2);
    }

    #[tokio::test]
    async fn missing_package_fails_without_poisoning_the_cache() {
        let temp_dir = TempDir::new().unwrap();
        let (manager, _) = manager_for(&temp_dir);

        let first = manager.get_or_create(&release("4.3.0")).await;
        assert!(matches!(
            first,
            Err(SandboxError::Build(BuildError::PackageNotInstalled { .. }))
        ));
        assert!(manager.cached(&release("4.3.0")).is_none());

        LocalPackageStore::new(temp_dir.path())
            .install_release(&release("4.3.0"), "net45")
            .unwrap();
        let retried = manager.get_or_create(&release("4.3.0")).await;

        assert!(retried.is_ok());
    }

    #[tokio::test]
    async fn no_compatible_target_lists_available_targets() {
        let temp_dir = TempDir::new().unwrap();
        LocalPackageStore::new(temp_dir.path())
            .install_release(&release("2.14.0"), "sl5")
            .unwrap();
        let (manager, _) = manager_for(&temp_dir);

        let result = manager.get_or_create(&release("2.14.0")).await;

        match result {
            Err(SandboxError::Build(BuildError::NoCompatibleTarget { available, .. })) => {
                assert_eq!(available, vec!["sl5".to_string()]);
            }
            other => panic!("unexpected result: {:?}", other.map(|c| c.id())),
        }
    }

    #[tokio::test]
    async fn module_for_another_release_is_a_version_mismatch() {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalPackageStore::new(temp_dir.path());
        store.install_release(&release("4.3.0"), "net45").unwrap();
        // Versioning folder for 4.3.0 carrying a 4.0.0 binary
        store
            .install_module(
                "NuGet.Versioning",
                &release("4.3.0"),
                "net45",
                &ModuleDescriptor::new("NuGet.Versioning", &release("4.0.0")),
            )
            .unwrap();
        let (manager, _) = manager_for(&temp_dir);

        let result = manager.get_or_create(&release("4.3.0")).await;

        assert!(matches!(
            result,
            Err(SandboxError::Build(BuildError::VersionMismatch { .. }))
        ));
    }

    #[tokio::test]
    async fn unsupported_major_line_fails_before_touching_disk() {
        let temp_dir = TempDir::new().unwrap();
        let (manager, locator) = manager_for(&temp_dir);

        let result = manager.get_or_create(&release("7.0.0")).await;

        assert!(matches!(
            result,
            Err(SandboxError::Build(BuildError::UnsupportedLine(_)))
        ));
        assert_eq!(locator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn cancelled_request_returns_cancelled() {
        let temp_dir = TempDir::new().unwrap();
        LocalPackageStore::new(temp_dir.path())
            .install_release(&release("4.3.0"), "net45")
            .unwrap();
        let (manager, _) = manager_for(&temp_dir);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = manager
            .get_or_create_with_cancel(&release("4.3.0"), &cancel)
            .await;

        assert!(matches!(result, Err(SandboxError::Cancelled)));
        assert!(
            manager
                .get_or_create_with_cancel(&release("4.3.0"), &CancellationToken::new())
                .await
                .is_ok()
        );
    }

    /// Locator whose first lookup blocks until the test opens the gate
    struct GatedLocator {
        store: LocalPackageStore,
        calls: AtomicUsize,
        started: tokio::sync::Notify,
        gate: std::sync::Mutex<std::sync::mpsc::Receiver<()>>,
    }

    impl ArtifactLocator for GatedLocator {
        fn locate(&self, package_id: &str, release: &ReleaseId) -> InstalledPackage {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                self.started.notify_one();
                let _ = self.gate.lock().unwrap().recv();
            }
            self.store.locate(package_id, release)
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn build_survives_cancellation_mid_build() {
        let temp_dir = TempDir::new().unwrap();
        LocalPackageStore::new(temp_dir.path())
            .install_release(&release("4.3.0"), "net45")
            .unwrap();
        let (open_gate, gate) = std::sync::mpsc::channel();
        let locator = Arc::new(GatedLocator {
            store: LocalPackageStore::new(temp_dir.path()),
            calls: AtomicUsize::new(0),
            started: tokio::sync::Notify::new(),
            gate: std::sync::Mutex::new(gate),
        });
        let manager = Arc::new(ContextManager::new(locator.clone(), TargetSelector::default()));
        let cancel = CancellationToken::new();

        let request = {
            let manager = Arc::clone(&manager);
            let cancel = cancel.clone();
            tokio::spawn(async move {
                manager
                    .get_or_create_with_cancel(&release("4.3.0"), &cancel)
                    .await
            })
        };
        locator.started.notified().await;
        cancel.cancel();

        assert!(matches!(request.await.unwrap(), Err(SandboxError::Cancelled)));
        assert!(manager.cached(&release("4.3.0")).is_none());

        open_gate.send(()).unwrap();
        let first = manager.get_or_create(&release("4.3.0")).await.unwrap();
        let again = manager.get_or_create(&release("4.3.0")).await.unwrap();

        assert!(Arc::ptr_eq(&first, &again));
        // one lookup per package, from the single build
        assert_eq!(locator.calls.load(Ordering::SeqCst), 2);
    }
}
