//! Framework precedence over a release's catalog

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::derived::{FrameworkCatalog, precedence};
use crate::error::SandboxError;
use crate::facade::{Framework, FrameworkLogic, InputStatus};
use crate::release::ReleaseId;
use crate::service::tools::Field;

const PORTABLE_IDENTIFIER: &str = ".NETPortable";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FrameworkPrecedenceInput {
    pub framework: Option<String>,
    pub exclude_portable: bool,
    pub include_profiles: bool,
    /// Comma separated identifiers to leave out, e.g. `.NETCore, Silverlight`
    pub exclude_identifiers: Option<String>,
}

impl FrameworkPrecedenceInput {
    pub fn excluded_identifiers(&self) -> Vec<&str> {
        self.exclude_identifiers
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|identifier| !identifier.is_empty())
            .collect()
    }

    /// Whether a catalog entry takes part in the precedence
    fn keeps(&self, framework: &Framework) -> bool {
        let portable = framework.identifier().eq_ignore_ascii_case(PORTABLE_IDENTIFIER);
        if portable && self.exclude_portable {
            return false;
        }
        if !portable && framework.has_profile() && !self.include_profiles {
            return false;
        }
        !self
            .excluded_identifiers()
            .iter()
            .any(|excluded| framework.identifier().eq_ignore_ascii_case(excluded))
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameworkPrecedenceOutput {
    pub input_status: InputStatus,
    pub input: FrameworkPrecedenceInput,
    pub framework: Option<Framework>,
    pub precedence: Vec<Framework>,
}

#[derive(Clone)]
pub struct FrameworkPrecedenceService {
    logic: Arc<dyn FrameworkLogic>,
    catalog: Arc<FrameworkCatalog>,
}

impl FrameworkPrecedenceService {
    pub fn new(logic: Arc<dyn FrameworkLogic>, catalog: Arc<FrameworkCatalog>) -> Self {
        Self { logic, catalog }
    }

    pub fn version(&self) -> &ReleaseId {
        self.logic.release()
    }

    pub fn catalog(&self) -> &FrameworkCatalog {
        &self.catalog
    }

    pub fn frameworks(
        &self,
        input: FrameworkPrecedenceInput,
    ) -> Result<FrameworkPrecedenceOutput, SandboxError> {
        let field = Field::read(input.framework.as_deref(), |s| self.logic.parse(s))?;
        let input_status = field.status();

        let (framework, precedence) = match field.into_value() {
            Some(framework) => {
                let candidates: Vec<Framework> = self
                    .catalog
                    .frameworks()
                    .filter(|candidate| input.keeps(candidate))
                    .cloned()
                    .collect();
                let ordered = precedence(self.logic.as_ref(), &framework, &candidates)?;
                (Some(framework), ordered)
            }
            None => (None, Vec::new()),
        };

        Ok(FrameworkPrecedenceOutput {
            input_status,
            input,
            framework,
            precedence,
        })
    }
}

impl std::fmt::Debug for FrameworkPrecedenceService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameworkPrecedenceService")
            .field("release", self.version())
            .field("catalog", &self.catalog.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::bind_all;
    use crate::isolation::testing::context;
    use rstest::rstest;

    async fn service(release: &str) -> FrameworkPrecedenceService {
        let logic = bind_all(&*context(release).await).unwrap();
        let catalog = FrameworkCatalog::build(logic.framework.as_ref()).unwrap();
        FrameworkPrecedenceService::new(logic.framework, Arc::new(catalog))
    }

    fn input(framework: &str) -> FrameworkPrecedenceInput {
        FrameworkPrecedenceInput {
            framework: Some(framework.to_string()),
            ..Default::default()
        }
    }

    fn names(frameworks: &[Framework]) -> Vec<&str> {
        frameworks.iter().map(|f| f.short_folder_name()).collect()
    }

    #[rstest]
    #[case("4.3.0")]
    #[case("2.14.0")]
    #[tokio::test]
    async fn net451_prefers_itself_then_older_net(#[case] release: &str) {
        let service = service(release).await;

        let output = service.frameworks(input("net451")).unwrap();

        assert_eq!(output.input_status, InputStatus::Valid);
        let names = names(&output.precedence);
        assert_eq!(&names[..2], &["net451", "net45"]);
        assert!(names.contains(&"net40"));
        assert!(!names.contains(&"net46"));
    }

    #[tokio::test]
    async fn profiles_are_excluded_unless_requested() {
        let service = service("4.3.0").await;

        let without = service.frameworks(input("net45")).unwrap();
        let with = service
            .frameworks(FrameworkPrecedenceInput {
                include_profiles: true,
                ..input("net45")
            })
            .unwrap();

        assert!(!names(&without.precedence).contains(&"net40-client"));
        assert!(names(&with.precedence).contains(&"net40-client"));
    }

    #[tokio::test]
    async fn excluded_identifiers_are_filtered() {
        let service = service("4.3.0").await;

        let output = service
            .frameworks(FrameworkPrecedenceInput {
                exclude_identifiers: Some(" .NETStandard , .NETPortable".to_string()),
                ..input("net461")
            })
            .unwrap();

        assert!(!output.precedence.is_empty());
        assert!(
            output
                .precedence
                .iter()
                .all(|f| f.identifier() == ".NETFramework")
        );
    }

    #[tokio::test]
    async fn portable_frameworks_can_be_excluded() {
        let service = service("4.3.0").await;

        let output = service
            .frameworks(FrameworkPrecedenceInput {
                exclude_portable: true,
                ..input("net45")
            })
            .unwrap();

        assert!(
            output
                .precedence
                .iter()
                .all(|f| f.identifier() != PORTABLE_IDENTIFIER)
        );
    }

    #[rstest]
    #[case(None, InputStatus::Missing)]
    #[case(Some("  "), InputStatus::Missing)]
    #[case(Some("portable-net45+net-cf"), InputStatus::Invalid)]
    #[tokio::test]
    async fn unusable_framework_yields_no_precedence(
        #[case] framework: Option<&str>,
        #[case] status: InputStatus,
    ) {
        let service = service("4.3.0").await;

        let output = service
            .frameworks(FrameworkPrecedenceInput {
                framework: framework.map(String::from),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(output.input_status, status);
        assert!(output.precedence.is_empty());
    }
}
