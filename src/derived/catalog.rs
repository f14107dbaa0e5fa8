//! Enumerated framework catalog
//!
//! Seeds from every framework source the release offers, then closes the set
//! by re-parsing each entry's short folder name and canonical name and, where
//! the release can, expanding it. Entries are keyed by the lowercased
//! canonical name.

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, info};

use crate::engine::DottedVersion;
use crate::error::SandboxError;
use crate::facade::{Framework, FrameworkLogic, FrameworkSource};
use crate::release::ReleaseId;

#[derive(Debug, Clone)]
pub struct FrameworkCatalog {
    release: ReleaseId,
    entries: IndexMap<String, Framework>,
}

/// Sorted, case-insensitively deduplicated names of a catalog
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct FrameworkList {
    pub dot_net_framework_names: Vec<String>,
    pub short_folder_names: Vec<String>,
    pub identifiers: Vec<String>,
}

fn key(framework: &Framework) -> String {
    framework.dotnet_framework_name().to_ascii_lowercase()
}

impl FrameworkCatalog {
    pub fn build(logic: &dyn FrameworkLogic) -> Result<Self, SandboxError> {
        let mut entries: IndexMap<String, Framework> = IndexMap::new();

        for source in FrameworkSource::all() {
            if !logic.source_available(source) {
                debug!("{:?} is not offered by {}", source, logic.release());
                continue;
            }
            for framework in logic.frameworks(source)? {
                entries.entry(key(&framework)).or_insert(framework);
            }
        }

        // entries only grow, so walking by index visits everything added
        let mut index = 0;
        while let Some((_, framework)) = entries.get_index(index) {
            let framework = framework.clone();
            index += 1;

            let mut reached = Vec::new();
            for name in [framework.short_folder_name(), framework.dotnet_framework_name()] {
                if let Ok(parsed) = logic.parse(name) {
                    reached.push(parsed);
                }
            }
            if logic.expand_available() {
                reached.extend(logic.expand(&framework)?);
            }
            for found in reached {
                entries.entry(key(&found)).or_insert(found);
            }
        }

        let before = entries.len();
        entries.retain(|_, framework| {
            framework.version() != DottedVersion::MAX && round_trips(logic, framework)
        });
        info!(
            "Framework catalog for {}: {} entries ({} dropped)",
            logic.release(),
            entries.len(),
            before - entries.len()
        );

        Ok(Self {
            release: logic.release().clone(),
            entries,
        })
    }

    pub fn release(&self) -> &ReleaseId {
        &self.release
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn frameworks(&self) -> impl Iterator<Item = &Framework> {
        self.entries.values()
    }

    pub fn contains(&self, dotnet_framework_name: &str) -> bool {
        self.entries
            .contains_key(&dotnet_framework_name.to_ascii_lowercase())
    }

    pub fn list(&self) -> FrameworkList {
        FrameworkList {
            dot_net_framework_names: sorted_unique(
                self.frameworks().map(|f| f.dotnet_framework_name()),
            ),
            short_folder_names: sorted_unique(self.frameworks().map(|f| f.short_folder_name())),
            identifiers: sorted_unique(self.frameworks().map(|f| f.identifier())),
        }
    }
}

fn round_trips(logic: &dyn FrameworkLogic, framework: &Framework) -> bool {
    match logic.parse(framework.dotnet_framework_name()) {
        Ok(parsed) => parsed.dotnet_framework_name() == framework.dotnet_framework_name(),
        Err(_) => false,
    }
}

fn sorted_unique<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut names: Vec<String> = names
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect();
    names.sort_by(|a, b| {
        a.to_ascii_lowercase()
            .cmp(&b.to_ascii_lowercase())
            .then_with(|| a.cmp(b))
    });
    names.dedup_by(|a, b| a.eq_ignore_ascii_case(b));
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::bind_all;
    use crate::isolation::testing::context;
    use rstest::rstest;

    #[rstest]
    #[case("2.14.0")]
    #[case("3.4.4")]
    #[case("5.8.0")]
    #[tokio::test]
    async fn every_entry_round_trips(#[case] release: &str) {
        let logic = bind_all(&*context(release).await).unwrap();

        let catalog = FrameworkCatalog::build(logic.framework.as_ref()).unwrap();

        assert!(!catalog.is_empty());
        for framework in catalog.frameworks() {
            let parsed = logic.framework.parse(framework.dotnet_framework_name()).unwrap();
            assert_eq!(parsed.dotnet_framework_name(), framework.dotnet_framework_name());
            assert_ne!(framework.version(), DottedVersion::MAX);
        }
    }

    #[tokio::test]
    async fn modern_catalog_contains_common_frameworks() {
        let logic = bind_all(&*context("4.3.0").await).unwrap();

        let catalog = FrameworkCatalog::build(logic.framework.as_ref()).unwrap();

        assert!(catalog.contains(".NETFramework,Version=v4.5"));
        assert!(catalog.contains(".netstandard,version=v1.0"));
    }

    #[tokio::test]
    async fn single_digit_platforms_use_short_names() {
        let logic = bind_all(&*context("4.3.0").await).unwrap();

        let list = FrameworkCatalog::build(logic.framework.as_ref()).unwrap().list();

        for name in ["win8", "wp8", "sl4", "win81", "net40"] {
            assert!(list.short_folder_names.iter().any(|n| n == name), "{name} missing");
        }
        assert!(!list.short_folder_names.iter().any(|n| n == "win80" || n == "sl40"));

        let pcl = logic.framework.parse("portable-net45+win8").unwrap();
        assert_eq!(pcl.dotnet_framework_name(), ".NETPortable,Version=v4.5,Profile=Profile7");
    }

    #[tokio::test]
    async fn legacy_netstandard_follows_release() {
        let old = bind_all(&*context("2.8.6").await).unwrap();
        let new = bind_all(&*context("2.14.0").await).unwrap();

        let old = FrameworkCatalog::build(old.framework.as_ref()).unwrap();
        let new = FrameworkCatalog::build(new.framework.as_ref()).unwrap();

        assert!(!old.list().identifiers.contains(&".NETStandard".to_string()));
        assert!(new.list().identifiers.contains(&".NETStandard".to_string()));
    }

    #[test]
    fn names_are_sorted_and_deduplicated_ignoring_case() {
        let names = sorted_unique(["net45", "NET45", "Net40", "", "netstandard1.0"].into_iter());

        assert_eq!(names, vec!["Net40", "NET45", "netstandard1.0"]);
    }
}
