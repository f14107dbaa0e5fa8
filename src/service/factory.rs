//! Entry point for presentation layers
//!
//! Resolves releases, builds their contexts on demand and caches one
//! [`ToolsService`] and one framework list per release. An unknown or
//! unavailable release is `Ok(None)`, never an error.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::OnceCell;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::binding::bind_all;
use crate::config::SandboxConfig;
use crate::derived::{FrameworkCatalog, FrameworkList};
use crate::error::{FeedError, SandboxError};
use crate::isolation::ContextManager;
use crate::isolation::target::TargetSelector;
use crate::release::feed::{FlatContainerFeed, PackageFeed};
use crate::release::resolver::VersionResolver;
use crate::release::store::{ArtifactLocator, LocalPackageStore, PackageMaterializer};
use crate::release::ReleaseId;
use crate::service::precedence::FrameworkPrecedenceService;
use crate::service::tools::ToolsService;

type ServiceCell = Arc<OnceCell<Arc<ToolsService>>>;

pub struct ToolsFactory {
    resolver: VersionResolver,
    contexts: ContextManager,
    feeds: Vec<Arc<dyn PackageFeed>>,
    services: DashMap<ReleaseId, ServiceCell>,
    framework_lists: DashMap<ReleaseId, Arc<FrameworkList>>,
}

impl ToolsFactory {
    pub fn new(
        materializer: Arc<dyn PackageMaterializer>,
        locator: Arc<dyn ArtifactLocator>,
        selector: TargetSelector,
        feeds: Vec<Arc<dyn PackageFeed>>,
    ) -> Self {
        Self {
            resolver: VersionResolver::new(materializer),
            contexts: ContextManager::new(locator, selector),
            feeds,
            services: DashMap::new(),
            framework_lists: DashMap::new(),
        }
    }

    /// Factory over the configured package folder and feeds
    pub fn from_config(config: &SandboxConfig) -> Result<Self, SandboxError> {
        let store = Arc::new(LocalPackageStore::new(config.packages_dir()));
        let feeds = config
            .sources
            .iter()
            .map(|source| Ok(Arc::new(FlatContainerFeed::new(source)?) as Arc<dyn PackageFeed>))
            .collect::<Result<Vec<_>, FeedError>>()?;

        Ok(Self::new(
            store.clone(),
            store,
            TargetSelector::new(&config.target_preference),
            feeds,
        ))
    }

    pub fn contexts(&self) -> &ContextManager {
        &self.contexts
    }

    /// Locally available releases, newest first
    pub async fn get_available_versions(&self) -> Vec<ReleaseId> {
        self.resolver.get_available_versions().await
    }

    pub async fn get_latest_version(&self) -> Option<ReleaseId> {
        self.resolver.get_latest_version().await
    }

    /// Releases complete on at least one configured feed, newest first
    pub async fn get_versions_from_sources(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<ReleaseId>, SandboxError> {
        self.resolver.get_versions_from_sources(&self.feeds, cancel).await
    }

    /// Releases on the feeds that have not been downloaded yet
    pub async fn get_missing_versions(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<ReleaseId>, SandboxError> {
        self.resolver.get_missing_versions(&self.feeds, cancel).await
    }

    /// Service for `version`, or `None` when the release is not resolvable
    pub async fn get_service(&self, version: &str) -> Result<Option<Arc<ToolsService>>, SandboxError> {
        let Some(release) = ReleaseId::parse(version) else {
            debug!("'{}' is not a release identifier", version);
            return Ok(None);
        };

        if let Some(service) = self.services.get(&release).and_then(|cell| cell.value().get().cloned()) {
            return Ok(Some(service));
        }

        if !self.resolver.is_available(&release).await {
            debug!("Release {} is not available", release);
            return Ok(None);
        }

        let cell = self.services.entry(release.clone()).or_default().clone();
        let service = cell
            .get_or_try_init(|| self.build_service(&release))
            .await?;
        Ok(Some(Arc::clone(service)))
    }

    async fn build_service(&self, release: &ReleaseId) -> Result<Arc<ToolsService>, SandboxError> {
        let context = self.contexts.get_or_create(release).await?;
        let logic = bind_all(&context)?;
        let catalog = FrameworkCatalog::build(logic.framework.as_ref())?;
        info!(
            "Created tools service for {} ({} frameworks)",
            release,
            catalog.len()
        );
        Ok(Arc::new(ToolsService::new(logic, Arc::new(catalog))))
    }

    pub async fn get_framework_precedence_service(
        &self,
        version: &str,
    ) -> Result<Option<FrameworkPrecedenceService>, SandboxError> {
        Ok(self
            .get_service(version)
            .await?
            .map(|service| service.precedence_service().clone()))
    }

    /// Framework names known to `version`
    pub async fn get_framework_list(&self, version: &str) -> Result<Option<Arc<FrameworkList>>, SandboxError> {
        let Some(service) = self.get_service(version).await? else {
            return Ok(None);
        };
        let release = service.version().clone();

        let list = self
            .framework_lists
            .entry(release)
            .or_insert_with(|| Arc::new(service.precedence_service().catalog().list()))
            .clone();
        Ok(Some(list))
    }

    /// Framework names known to the latest release; empty when none is available
    pub async fn get_framework_list_latest(&self) -> Result<Arc<FrameworkList>, SandboxError> {
        let Some(latest) = self.get_latest_version().await else {
            return Ok(Arc::new(FrameworkList::default()));
        };
        Ok(self
            .get_framework_list(&latest.to_string())
            .await?
            .unwrap_or_default())
    }
}
