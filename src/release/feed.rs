//! NuGet v3 flat container feed

#[cfg(test)]
use mockall::automock;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::FeedError;
use crate::release::ReleaseId;

/// Trait for listing the published releases of a package
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait PackageFeed: Send + Sync {
    /// Source URL, used in log messages
    fn source(&self) -> String;

    /// Fetches all published versions of a package, oldest first
    async fn list_versions(&self, package_id: &str) -> Result<Vec<ReleaseId>, FeedError>;
}

/// Response from the flat container `index.json` endpoint
#[derive(Debug, Deserialize)]
struct FlatContainerIndex {
    versions: Vec<String>,
}

/// Feed implementation for the flat container API
#[derive(Clone)]
pub struct FlatContainerFeed {
    client: reqwest::Client,
    base_url: String,
}

impl FlatContainerFeed {
    /// Creates a new FlatContainerFeed with a custom base URL
    pub fn new(base_url: &str) -> Result<Self, FeedError> {
        Ok(Self {
            client: reqwest::Client::builder()
                .user_agent("nuget-sandbox")
                .build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait::async_trait]
impl PackageFeed for FlatContainerFeed {
    fn source(&self) -> String {
        self.base_url.clone()
    }

    async fn list_versions(&self, package_id: &str) -> Result<Vec<ReleaseId>, FeedError> {
        let url = format!("{}/{}/index.json", self.base_url, package_id.to_lowercase());

        let response = self.client.get(&url).send().await?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FeedError::NotFound(package_id.to_string()));
        }

        if !status.is_success() {
            warn!("Feed returned status {}: {}", status, url);
            return Err(FeedError::InvalidResponse(format!(
                "Unexpected status: {}",
                status
            )));
        }

        let index: FlatContainerIndex = response.json().await.map_err(|e| {
            warn!("Failed to parse flat container index: {}", e);
            FeedError::InvalidResponse(e.to_string())
        })?;

        let mut versions: Vec<ReleaseId> = index
            .versions
            .iter()
            .filter_map(|v| match v.parse::<ReleaseId>() {
                Ok(release) => Some(release),
                Err(_) => {
                    debug!("Skipping {} {}: not a release identifier", package_id, v);
                    None
                }
            })
            .collect();

        versions.sort();

        Ok(versions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    #[tokio::test]
    async fn list_versions_returns_versions_sorted() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/nuget.versioning/index.json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"versions": ["4.3.0", "3.5.0", "5.0.0-preview1", "2.8.60610.756"]}"#)
            .create_async()
            .await;

        let feed = FlatContainerFeed::new(&server.url()).unwrap();
        let result = feed.list_versions("NuGet.Versioning").await.unwrap();

        mock.assert_async().await;
        let result: Vec<String> = result.iter().map(|r| r.to_string()).collect();
        assert_eq!(result, vec!["3.5.0", "4.3.0", "5.0.0-preview1"]);
    }

    #[tokio::test]
    async fn list_versions_returns_not_found_for_unknown_package() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/no.such.package/index.json")
            .with_status(404)
            .create_async()
            .await;

        let feed = FlatContainerFeed::new(&server.url()).unwrap();
        let result = feed.list_versions("No.Such.Package").await;

        mock.assert_async().await;
        assert!(matches!(result, Err(FeedError::NotFound(_))));
    }

    #[tokio::test]
    async fn list_versions_reports_invalid_body() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/nuget.core/index.json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("not json")
            .create_async()
            .await;

        let feed = FlatContainerFeed::new(&format!("{}/", server.url())).unwrap();
        let result = feed.list_versions("NuGet.Core").await;

        mock.assert_async().await;
        assert!(matches!(result, Err(FeedError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn list_versions_reports_server_error() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/nuget.core/index.json")
            .with_status(500)
            .create_async()
            .await;

        let feed = FlatContainerFeed::new(&server.url()).unwrap();
        let result = feed.list_versions("NuGet.Core").await;

        mock.assert_async().await;
        assert!(matches!(result, Err(FeedError::InvalidResponse(_))));
    }
}
