//! Available release resolution
//!
//! A release is available when every package of its group has been materialized.
//! Legacy and modern groups are resolved separately and merged, newest first.

use std::collections::HashSet;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::SandboxError;
use crate::release::feed::PackageFeed;
use crate::release::store::PackageMaterializer;
use crate::release::{ReleaseGroup, ReleaseId};

pub struct VersionResolver {
    materializer: Arc<dyn PackageMaterializer>,
}

impl VersionResolver {
    pub fn new(materializer: Arc<dyn PackageMaterializer>) -> Self {
        Self { materializer }
    }

    /// Releases available locally, newest first. Never fails: an unreadable store
    /// contributes no versions.
    pub async fn get_available_versions(&self) -> Vec<ReleaseId> {
        self.get_available_versions_with_cancel(&CancellationToken::new())
            .await
            .unwrap_or_default()
    }

    /// Like [`Self::get_available_versions`], aborting between group lookups when
    /// `cancel` fires.
    pub async fn get_available_versions_with_cancel(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<ReleaseId>, SandboxError> {
        let mut versions = HashSet::new();

        for group in ReleaseGroup::all() {
            if cancel.is_cancelled() {
                return Err(SandboxError::Cancelled);
            }

            let downloaded = tokio::select! {
                _ = cancel.cancelled() => return Err(SandboxError::Cancelled),
                result = self.materializer.get_downloaded_versions(group.package_ids()) => result,
            };

            match downloaded {
                Ok(found) => {
                    debug!("Found {} {} releases", found.len(), group.as_str());
                    versions.extend(found.into_iter().filter(|r| group.contains(r)));
                }
                Err(e) => warn!("Failed to list {} releases: {}", group.as_str(), e),
            }
        }

        Ok(sort_newest_first(versions))
    }

    /// Head of the available list
    pub async fn get_latest_version(&self) -> Option<ReleaseId> {
        self.get_available_versions().await.into_iter().next()
    }

    /// True when the release is locally resolvable
    pub async fn is_available(&self, release: &ReleaseId) -> bool {
        let group = release.group();
        self.materializer
            .get_downloaded_versions(group.package_ids())
            .await
            .map(|versions| versions.contains(release))
            .unwrap_or(false)
    }

    /// Releases published on at least one feed with every package of their group,
    /// newest first. Feeds that fail are logged and skipped.
    pub async fn get_versions_from_sources(
        &self,
        feeds: &[Arc<dyn PackageFeed>],
        cancel: &CancellationToken,
    ) -> Result<Vec<ReleaseId>, SandboxError> {
        let mut versions = HashSet::new();

        for feed in feeds {
            for group in ReleaseGroup::all() {
                let mut group_versions: Option<HashSet<ReleaseId>> = None;

                for package_id in group.package_ids() {
                    if cancel.is_cancelled() {
                        return Err(SandboxError::Cancelled);
                    }

                    let listed = tokio::select! {
                        _ = cancel.cancelled() => return Err(SandboxError::Cancelled),
                        result = feed.list_versions(package_id) => result,
                    };

                    let listed: HashSet<ReleaseId> = match listed {
                        Ok(listed) => listed.into_iter().filter(|r| group.contains(r)).collect(),
                        Err(e) => {
                            warn!("Failed to list {} on {}: {}", package_id, feed.source(), e);
                            HashSet::new()
                        }
                    };

                    group_versions = Some(match group_versions {
                        None => listed,
                        Some(previous) => previous.intersection(&listed).cloned().collect(),
                    });
                }

                versions.extend(group_versions.unwrap_or_default());
            }
        }

        Ok(sort_newest_first(versions))
    }

    /// Releases published on the feeds but not yet materialized locally
    pub async fn get_missing_versions(
        &self,
        feeds: &[Arc<dyn PackageFeed>],
        cancel: &CancellationToken,
    ) -> Result<Vec<ReleaseId>, SandboxError> {
        let remote = self.get_versions_from_sources(feeds, cancel).await?;
        let local: HashSet<ReleaseId> = self
            .get_available_versions_with_cancel(cancel)
            .await?
            .into_iter()
            .collect();

        Ok(remote.into_iter().filter(|r| !local.contains(r)).collect())
    }
}

fn sort_newest_first(versions: HashSet<ReleaseId>) -> Vec<ReleaseId> {
    let mut versions: Vec<ReleaseId> = versions.into_iter().collect();
    versions.sort_by(|a, b| b.cmp(a));
    versions
}
