//! Tools service
//!
//! Input records carry raw strings the way a form or a command line delivers
//! them. Every output reports an [`InputStatus`]: `Missing` when a required
//! field is blank, `Invalid` when one failed to parse, otherwise `Valid` with
//! the result populated. Parse failures never escape as errors.

use std::cmp::Ordering;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::derived::{self, BatchParse, FrameworkCatalog};
use crate::error::SandboxError;
use crate::facade::{Framework, InputStatus, LogicSet, Version, VersionRange};
use crate::release::ReleaseId;
use crate::service::precedence::{
    FrameworkPrecedenceInput, FrameworkPrecedenceOutput, FrameworkPrecedenceService,
};

/// One input field after parsing
#[derive(Debug, Clone)]
pub(crate) enum Field<T> {
    Missing,
    Invalid,
    Valid(T),
}

impl<T> Field<T> {
    pub(crate) fn read<F>(value: Option<&str>, parse: F) -> Result<Self, SandboxError>
    where
        F: FnOnce(&str) -> Result<T, SandboxError>,
    {
        let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
            return Ok(Field::Missing);
        };
        match parse(value) {
            Ok(parsed) => Ok(Field::Valid(parsed)),
            Err(SandboxError::Parse(e)) => {
                debug!("{}", e);
                Ok(Field::Invalid)
            }
            Err(e) => Err(e),
        }
    }

    pub(crate) fn status(&self) -> InputStatus {
        match self {
            Field::Missing => InputStatus::Missing,
            Field::Invalid => InputStatus::Invalid,
            Field::Valid(_) => InputStatus::Valid,
        }
    }

    pub(crate) fn is_valid(&self) -> bool {
        matches!(self, Field::Valid(_))
    }

    pub(crate) fn value(&self) -> Option<&T> {
        match self {
            Field::Valid(value) => Some(value),
            _ => None,
        }
    }

    pub(crate) fn into_value(self) -> Option<T> {
        match self {
            Field::Valid(value) => Some(value),
            _ => None,
        }
    }
}

/// Missing wins over Invalid, Invalid over Valid
fn combine(statuses: &[InputStatus]) -> InputStatus {
    if statuses.contains(&InputStatus::Missing) {
        InputStatus::Missing
    } else if statuses.contains(&InputStatus::Invalid) {
        InputStatus::Invalid
    } else {
        InputStatus::Valid
    }
}

fn sign(ordering: Ordering) -> i32 {
    match ordering {
        Ordering::Less => -1,
        Ordering::Equal => 0,
        Ordering::Greater => 1,
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParseFrameworkInput {
    pub framework: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseFrameworkOutput {
    pub input_status: InputStatus,
    pub input: ParseFrameworkInput,
    pub framework: Option<Framework>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParseVersionInput {
    pub version: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseVersionOutput {
    pub input_status: InputStatus,
    pub input: ParseVersionInput,
    pub version: Option<Version>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParseVersionRangeInput {
    pub version_range: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseVersionRangeOutput {
    pub input_status: InputStatus,
    pub input: ParseVersionRangeInput,
    pub version_range: Option<VersionRange>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FrameworkCompatibilityInput {
    pub project: Option<String>,
    pub package: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameworkCompatibilityOutput {
    pub input_status: InputStatus,
    pub input: FrameworkCompatibilityInput,
    pub is_project_valid: bool,
    pub is_package_valid: bool,
    pub project: Option<Framework>,
    pub package: Option<Framework>,
    pub is_compatible: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GetNearestFrameworkInput {
    pub project: Option<String>,
    /// One package framework per line
    pub package: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetNearestFrameworkOutput {
    pub input_status: InputStatus,
    pub input: GetNearestFrameworkInput,
    pub is_project_valid: bool,
    pub project: Option<Framework>,
    /// Package lines that failed to parse, verbatim
    pub invalid: Vec<String>,
    pub valid: Vec<Framework>,
    /// Valid packages the project can consume, in input order
    pub compatible: Vec<Framework>,
    pub nearest: Option<Framework>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VersionComparisonInput {
    pub version_a: Option<String>,
    pub version_b: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionComparisonOutput {
    pub input_status: InputStatus,
    pub input: VersionComparisonInput,
    pub is_version_a_valid: bool,
    pub is_version_b_valid: bool,
    pub version_a: Option<Version>,
    pub version_b: Option<Version>,
    /// -1, 0 or 1
    pub result: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VersionSatisfiesInput {
    pub version_range: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionSatisfiesOutput {
    pub input_status: InputStatus,
    pub input: VersionSatisfiesInput,
    pub is_version_range_valid: bool,
    pub is_version_valid: bool,
    pub version_range: Option<VersionRange>,
    pub version: Option<Version>,
    pub satisfies: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FindBestVersionMatchInput {
    pub version_range: Option<String>,
    /// One version per line
    pub versions: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FindBestVersionMatchOutput {
    pub input_status: InputStatus,
    pub input: FindBestVersionMatchInput,
    pub is_version_range_valid: bool,
    pub version_range: Option<VersionRange>,
    pub invalid: Vec<String>,
    pub valid: Vec<Version>,
    /// Satisfying versions, best first
    pub ranked: Vec<Version>,
    pub non_satisfying: Vec<Version>,
    pub best_match: Option<Version>,
}

/// Operations over one bound release
#[derive(Clone)]
pub struct ToolsService {
    logic: LogicSet,
    precedence: FrameworkPrecedenceService,
}

impl ToolsService {
    pub fn new(logic: LogicSet, catalog: Arc<FrameworkCatalog>) -> Self {
        let precedence = FrameworkPrecedenceService::new(Arc::clone(&logic.framework), catalog);
        Self { logic, precedence }
    }

    pub fn version(&self) -> &ReleaseId {
        self.logic.release()
    }

    pub fn logic(&self) -> &LogicSet {
        &self.logic
    }

    pub fn precedence_service(&self) -> &FrameworkPrecedenceService {
        &self.precedence
    }

    fn batch<T>(
        text: Option<&str>,
        parse: impl FnMut(&str) -> Result<T, SandboxError>,
    ) -> Result<BatchParse<T>, SandboxError> {
        derived::parse_lines(text.unwrap_or_default(), parse)
    }

    pub fn parse_framework(
        &self,
        input: ParseFrameworkInput,
    ) -> Result<ParseFrameworkOutput, SandboxError> {
        let framework = Field::read(input.framework.as_deref(), |s| self.logic.framework.parse(s))?;
        Ok(ParseFrameworkOutput {
            input_status: framework.status(),
            input,
            framework: framework.into_value(),
        })
    }

    pub fn parse_version(&self, input: ParseVersionInput) -> Result<ParseVersionOutput, SandboxError> {
        let version = Field::read(input.version.as_deref(), |s| self.logic.version.parse(s))?;
        Ok(ParseVersionOutput {
            input_status: version.status(),
            input,
            version: version.into_value(),
        })
    }

    pub fn parse_version_range(
        &self,
        input: ParseVersionRangeInput,
    ) -> Result<ParseVersionRangeOutput, SandboxError> {
        let range = Field::read(input.version_range.as_deref(), |s| self.logic.range.parse(s))?;
        Ok(ParseVersionRangeOutput {
            input_status: range.status(),
            input,
            version_range: range.into_value(),
        })
    }

    pub fn framework_compatibility(
        &self,
        input: FrameworkCompatibilityInput,
    ) -> Result<FrameworkCompatibilityOutput, SandboxError> {
        let logic = &self.logic.framework;
        let project = Field::read(input.project.as_deref(), |s| logic.parse(s))?;
        let package = Field::read(input.package.as_deref(), |s| logic.parse(s))?;

        let is_compatible = match (project.value(), package.value()) {
            (Some(project), Some(package)) => Some(logic.is_compatible(project, package)?),
            _ => None,
        };

        Ok(FrameworkCompatibilityOutput {
            input_status: combine(&[project.status(), package.status()]),
            input,
            is_project_valid: project.is_valid(),
            is_package_valid: package.is_valid(),
            project: project.into_value(),
            package: package.into_value(),
            is_compatible,
        })
    }

    pub fn get_nearest_framework(
        &self,
        input: GetNearestFrameworkInput,
    ) -> Result<GetNearestFrameworkOutput, SandboxError> {
        let logic = &self.logic.framework;
        let project = Field::read(input.project.as_deref(), |s| logic.parse(s))?;
        let packages = Self::batch(input.package.as_deref(), |s| logic.parse(s))?;

        let (compatible, nearest) = match project.value() {
            Some(project) if !packages.valid.is_empty() => (
                derived::compatible(logic.as_ref(), project, &packages.valid)?,
                logic.get_nearest(project, &packages.valid)?,
            ),
            _ => (Vec::new(), None),
        };

        Ok(GetNearestFrameworkOutput {
            input_status: combine(&[project.status(), packages.status]),
            input,
            is_project_valid: project.is_valid(),
            project: project.into_value(),
            invalid: packages.invalid,
            valid: packages.valid,
            compatible,
            nearest,
        })
    }

    pub fn version_comparison(
        &self,
        input: VersionComparisonInput,
    ) -> Result<VersionComparisonOutput, SandboxError> {
        let logic = &self.logic.version;
        let a = Field::read(input.version_a.as_deref(), |s| logic.parse(s))?;
        let b = Field::read(input.version_b.as_deref(), |s| logic.parse(s))?;

        let result = match (a.value(), b.value()) {
            (Some(a), Some(b)) => Some(sign(logic.compare(a, b)?)),
            _ => None,
        };

        Ok(VersionComparisonOutput {
            input_status: combine(&[a.status(), b.status()]),
            input,
            is_version_a_valid: a.is_valid(),
            is_version_b_valid: b.is_valid(),
            version_a: a.into_value(),
            version_b: b.into_value(),
            result,
        })
    }

    pub fn version_satisfies(
        &self,
        input: VersionSatisfiesInput,
    ) -> Result<VersionSatisfiesOutput, SandboxError> {
        let range = Field::read(input.version_range.as_deref(), |s| self.logic.range.parse(s))?;
        let version = Field::read(input.version.as_deref(), |s| self.logic.version.parse(s))?;

        let satisfies = match (range.value(), version.value()) {
            (Some(range), Some(version)) => Some(self.logic.range.satisfies(range, version)?),
            _ => None,
        };

        Ok(VersionSatisfiesOutput {
            input_status: combine(&[range.status(), version.status()]),
            input,
            is_version_range_valid: range.is_valid(),
            is_version_valid: version.is_valid(),
            version_range: range.into_value(),
            version: version.into_value(),
            satisfies,
        })
    }

    pub fn find_best_version_match(
        &self,
        input: FindBestVersionMatchInput,
    ) -> Result<FindBestVersionMatchOutput, SandboxError> {
        let range = Field::read(input.version_range.as_deref(), |s| self.logic.range.parse(s))?;
        let versions = Self::batch(input.versions.as_deref(), |s| self.logic.version.parse(s))?;

        let ranking = match range.value() {
            Some(range) if !versions.valid.is_empty() => Some(derived::find_best_match(
                self.logic.version.as_ref(),
                self.logic.range.as_ref(),
                range,
                &versions.valid,
            )?),
            _ => None,
        };
        let (ranked, non_satisfying, best_match) = match ranking {
            Some(ranking) => (ranking.ranked, ranking.non_satisfying, ranking.best),
            None => (Vec::new(), Vec::new(), None),
        };

        Ok(FindBestVersionMatchOutput {
            input_status: combine(&[range.status(), versions.status]),
            input,
            is_version_range_valid: range.is_valid(),
            version_range: range.into_value(),
            invalid: versions.invalid,
            valid: versions.valid,
            ranked,
            non_satisfying,
            best_match,
        })
    }

    pub fn framework_precedence(
        &self,
        input: FrameworkPrecedenceInput,
    ) -> Result<FrameworkPrecedenceOutput, SandboxError> {
        self.precedence.frameworks(input)
    }
}

impl std::fmt::Debug for ToolsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolsService")
            .field("release", self.version())
            .field("context", &self.logic.context())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::bind_all;
    use crate::isolation::testing::context;
    use rstest::rstest;

    async fn service(release: &str) -> ToolsService {
        let logic = bind_all(&*context(release).await).unwrap();
        let catalog = FrameworkCatalog::build(logic.framework.as_ref()).unwrap();
        ToolsService::new(logic, Arc::new(catalog))
    }

    fn some(value: &str) -> Option<String> {
        Some(value.to_string())
    }

    #[rstest]
    #[case(None, InputStatus::Missing)]
    #[case(Some("   "), InputStatus::Missing)]
    #[case(Some("portable-net45+net-cf"), InputStatus::Invalid)]
    #[case(Some("net45"), InputStatus::Valid)]
    #[tokio::test]
    async fn parse_framework_reports_status(
        #[case] framework: Option<&str>,
        #[case] status: InputStatus,
    ) {
        let service = service("4.3.0").await;

        let output = service
            .parse_framework(ParseFrameworkInput {
                framework: framework.map(String::from),
            })
            .unwrap();

        assert_eq!(output.input_status, status);
        assert_eq!(output.framework.is_some(), status == InputStatus::Valid);
    }

    #[rstest]
    #[case("4.3.0")]
    #[case("2.14.0")]
    #[tokio::test]
    async fn get_nearest_framework_splits_invalid_lines(#[case] release: &str) {
        let service = service(release).await;

        let output = service
            .get_nearest_framework(GetNearestFrameworkInput {
                project: some("net451"),
                package: some("net40\nnet45\n\nnetstandard1.6\nportable-net45+net-cf\n"),
            })
            .unwrap();

        assert_eq!(output.input_status, InputStatus::Valid);
        assert_eq!(output.invalid, vec!["portable-net45+net-cf"]);
        let compatible: Vec<&str> = output.compatible.iter().map(|f| f.short_folder_name()).collect();
        assert_eq!(compatible, vec!["net40", "net45"]);
        assert_eq!(output.nearest.unwrap().short_folder_name(), "net45");
    }

    #[tokio::test]
    async fn get_nearest_framework_without_packages_is_missing() {
        let service = service("4.3.0").await;

        let output = service
            .get_nearest_framework(GetNearestFrameworkInput {
                project: some("net45"),
                package: some("\n  \n"),
            })
            .unwrap();

        assert_eq!(output.input_status, InputStatus::Missing);
        assert!(output.nearest.is_none());
    }

    #[rstest]
    #[case("netstandard1.0", Some(true))]
    #[case("netstandard1.3", Some(false))]
    #[tokio::test]
    async fn framework_compatibility_for_net45(#[case] package: &str, #[case] expected: Option<bool>) {
        let service = service("5.8.0").await;

        let output = service
            .framework_compatibility(FrameworkCompatibilityInput {
                project: some("net45"),
                package: some(package),
            })
            .unwrap();

        assert_eq!(output.input_status, InputStatus::Valid);
        assert_eq!(output.is_compatible, expected);
    }

    #[tokio::test]
    async fn framework_compatibility_with_invalid_package() {
        let service = service("4.3.0").await;

        let output = service
            .framework_compatibility(FrameworkCompatibilityInput {
                project: some("net45"),
                package: some("portable-net45+net-cf"),
            })
            .unwrap();

        assert_eq!(output.input_status, InputStatus::Invalid);
        assert!(output.is_project_valid);
        assert!(!output.is_package_valid);
        assert_eq!(output.is_compatible, None);
    }

    #[rstest]
    #[case("1.0", "2.0.0-beta", -1)]
    #[case("2.0", "1.0.0-beta", 1)]
    #[case("1", "1.0.0.0", 0)]
    #[tokio::test]
    async fn version_comparison_returns_sign(#[case] a: &str, #[case] b: &str, #[case] expected: i32) {
        for release in ["2.14.0", "4.3.0"] {
            let service = service(release).await;

            let output = service
                .version_comparison(VersionComparisonInput {
                    version_a: some(a),
                    version_b: some(b),
                })
                .unwrap();

            assert_eq!(output.result, Some(expected), "release {}", release);
        }
    }

    #[tokio::test]
    async fn version_comparison_with_missing_side() {
        let service = service("4.3.0").await;

        let output = service
            .version_comparison(VersionComparisonInput {
                version_a: some("not-a-version"),
                version_b: None,
            })
            .unwrap();

        assert_eq!(output.input_status, InputStatus::Missing);
        assert!(!output.is_version_a_valid);
        assert_eq!(output.result, None);
    }

    #[tokio::test]
    async fn version_satisfies_checks_bounds() {
        let service = service("4.3.0").await;

        let output = service
            .version_satisfies(VersionSatisfiesInput {
                version_range: some("[1.0.0, 2.0.0)"),
                version: some("2.0.0"),
            })
            .unwrap();

        assert_eq!(output.input_status, InputStatus::Valid);
        assert_eq!(output.satisfies, Some(false));
    }

    #[rstest]
    #[case("2.14.0")]
    #[case("4.3.0")]
    #[tokio::test]
    async fn find_best_version_match_keeps_partial_success(#[case] release: &str) {
        let service = service(release).await;

        let output = service
            .find_best_version_match(FindBestVersionMatchInput {
                version_range: some("[1.0.0, 2.0.0]"),
                versions: some("0.9.0\nbogus version\n1.5.0\n2.1.0"),
            })
            .unwrap();

        assert_eq!(output.input_status, InputStatus::Valid);
        assert_eq!(output.invalid, vec!["bogus version"]);
        assert_eq!(output.valid.len(), 3);
        assert_eq!(output.best_match.unwrap().normalized_string(), "1.5.0");
    }

    #[tokio::test]
    async fn find_best_version_match_with_only_invalid_versions() {
        let service = service("4.3.0").await;

        let output = service
            .find_best_version_match(FindBestVersionMatchInput {
                version_range: some("[1.0.0, 2.0.0]"),
                versions: some("nope\nalso nope"),
            })
            .unwrap();

        assert_eq!(output.input_status, InputStatus::Invalid);
        assert!(output.best_match.is_none());
    }

    #[tokio::test]
    async fn service_reports_its_version() {
        let service = service("4.3.0").await;

        assert_eq!(service.version().to_string(), "4.3.0");
        assert_eq!(service.precedence_service().version().to_string(), "4.3.0");
    }
}
