//! Capability binder
//!
//! Turns an isolation context into logic adapters. The strategy is picked once
//! from the context's adapter line:
//!
//! - [`legacy`]: typed calls into the `NuGet.Core` entry point (v2)
//! - [`modern`]: member-table lookups over `NuGet.Frameworks` and
//!   `NuGet.Versioning` (v3 to v6)
//!
//! Binding reads the context and never changes it.

pub mod legacy;
pub(crate) mod members;
pub mod modern;

use std::sync::Arc;

use crate::error::SandboxError;
use crate::facade::{FrameworkLogic, LogicSet, VersionLogic, VersionRangeLogic};
use crate::isolation::{AdapterLine, IsolationContext};

pub use legacy::LegacyBinding;
pub use modern::ModernBinding;

/// Logical capability family to bind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalDomain {
    Framework,
    Version,
    VersionRange,
}

#[derive(Clone)]
pub enum LogicAdapter {
    Framework(Arc<dyn FrameworkLogic>),
    Version(Arc<dyn VersionLogic>),
    VersionRange(Arc<dyn VersionRangeLogic>),
}

/// Strategy chosen for a context
#[derive(Debug, Clone)]
pub enum Binding {
    Legacy(LegacyBinding),
    Modern(ModernBinding),
}

impl Binding {
    pub fn for_context(context: &IsolationContext) -> Result<Self, SandboxError> {
        match context.line() {
            AdapterLine::V2 => Ok(Binding::Legacy(LegacyBinding::bind(context)?)),
            AdapterLine::V3 | AdapterLine::V4 | AdapterLine::V5 | AdapterLine::V6 => {
                Ok(Binding::Modern(ModernBinding::bind(context)?))
            }
        }
    }

    pub fn adapter(&self, domain: LogicalDomain) -> LogicAdapter {
        match (self, domain) {
            (Binding::Legacy(b), LogicalDomain::Framework) => LogicAdapter::Framework(b.framework_logic()),
            (Binding::Legacy(b), LogicalDomain::Version) => LogicAdapter::Version(b.version_logic()),
            (Binding::Legacy(b), LogicalDomain::VersionRange) => LogicAdapter::VersionRange(b.range_logic()),
            (Binding::Modern(b), LogicalDomain::Framework) => LogicAdapter::Framework(b.framework_logic()),
            (Binding::Modern(b), LogicalDomain::Version) => LogicAdapter::Version(b.version_logic()),
            (Binding::Modern(b), LogicalDomain::VersionRange) => LogicAdapter::VersionRange(b.range_logic()),
        }
    }

    pub fn logic_set(&self) -> LogicSet {
        match self {
            Binding::Legacy(b) => LogicSet {
                framework: b.framework_logic(),
                version: b.version_logic(),
                range: b.range_logic(),
            },
            Binding::Modern(b) => LogicSet {
                framework: b.framework_logic(),
                version: b.version_logic(),
                range: b.range_logic(),
            },
        }
    }
}

/// Adapter for one logical domain of `context`
pub fn bind(context: &IsolationContext, domain: LogicalDomain) -> Result<LogicAdapter, SandboxError> {
    Ok(Binding::for_context(context)?.adapter(domain))
}

/// All three adapters of `context`, sharing one member resolution
pub fn bind_all(context: &IsolationContext) -> Result<LogicSet, SandboxError> {
    Ok(Binding::for_context(context)?.logic_set())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::modern::{VERSIONING_ASSEMBLY, members};
    use crate::isolation::testing::{context, context_with_exports};
    use rstest::rstest;
    use std::cmp::Ordering;

    #[tokio::test]
    async fn bind_returns_adapter_for_requested_domain() {
        let context = context("4.3.0").await;

        assert!(matches!(
            bind(&context, LogicalDomain::Framework).unwrap(),
            LogicAdapter::Framework(_)
        ));
        assert!(matches!(
            bind(&context, LogicalDomain::VersionRange).unwrap(),
            LogicAdapter::VersionRange(_)
        ));
    }

    #[rstest]
    #[case("2.14.0", false, false, false)]
    #[case("3.4.4", true, false, false)]
    #[case("3.5.0", true, true, false)]
    #[case("4.3.0", true, true, true)]
    #[tokio::test]
    async fn capability_flags_follow_release(
        #[case] release: &str,
        #[case] find_best_match: bool,
        #[case] is_better: bool,
        #[case] is_semver2: bool,
    ) {
        let logic = bind_all(&*context(release).await).unwrap();

        assert_eq!(logic.range.find_best_match_available(), find_best_match);
        assert_eq!(logic.range.is_better_available(), is_better);
        assert_eq!(logic.version.is_semver2_available(), is_semver2);
        assert_eq!(logic.version.full_string_available(), is_better);
    }

    #[tokio::test]
    async fn entity_flags_match_adapter_flags() {
        let logic = bind_all(&*context("3.4.4").await).unwrap();

        let version = logic.version.parse("1.0.0-beta.1+git").unwrap();

        assert!(!version.full_string_available());
        assert!(matches!(
            version.full_string(),
            Err(SandboxError::Unsupported { capability: "FullString", .. })
        ));
        assert_eq!(version.normalized_string(), "1.0.0-beta.1");
    }

    #[rstest]
    #[case("2.14.0")]
    #[case("4.3.0")]
    #[tokio::test]
    async fn compares_versions(#[case] release: &str) {
        let logic = bind_all(&*context(release).await).unwrap();
        let compare = |a: &str, b: &str| {
            let a = logic.version.parse(a).unwrap();
            let b = logic.version.parse(b).unwrap();
            logic.version.compare(&a, &b).unwrap()
        };

        assert_eq!(compare("1.0", "2.0.0-beta"), Ordering::Less);
        assert_eq!(compare("2.0", "1.0.0-beta"), Ordering::Greater);
        assert_eq!(compare("1", "1.0.0.0"), Ordering::Equal);
    }

    #[rstest]
    #[case("2.14.0")]
    #[case("5.8.0")]
    #[tokio::test]
    async fn net45_consumes_netstandard_up_to_1_1(#[case] release: &str) {
        let logic = bind_all(&*context(release).await).unwrap();
        let framework = |name: &str| logic.framework.parse(name).unwrap();

        let net45 = framework("net45");

        assert!(logic.framework.is_compatible(&net45, &framework("netstandard1.0")).unwrap());
        assert!(!logic.framework.is_compatible(&net45, &framework("netstandard1.3")).unwrap());
    }

    #[tokio::test]
    async fn parse_failure_is_a_parse_error() {
        let logic = bind_all(&*context("4.3.0").await).unwrap();

        let result = logic.framework.parse("portable-net45+net-cf");

        assert!(matches!(result, Err(SandboxError::Parse(_))));
    }

    #[tokio::test]
    async fn entity_from_another_context_is_rejected() {
        let first = bind_all(&*context("4.3.0").await).unwrap();
        let second = bind_all(&*context("4.3.0").await).unwrap();
        let range = first.range.parse("[1.0.0, 2.0.0]").unwrap();
        let version = second.version.parse("1.5.0").unwrap();

        let result = first.range.satisfies(&range, &version);

        match result {
            Err(SandboxError::ContextMismatch { expected, actual }) => {
                assert_eq!(expected, first.context());
                assert_eq!(actual, second.context());
            }
            other => panic!("expected a context mismatch, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn entity_from_the_other_generation_is_rejected() {
        let legacy = bind_all(&*context("2.14.0").await).unwrap();
        let modern = bind_all(&*context("4.3.0").await).unwrap();
        let net45 = legacy.framework.parse("net45").unwrap();
        let net40 = modern.framework.parse("net40").unwrap();

        let result = modern.framework.is_compatible(&net45, &net40);

        assert!(matches!(result, Err(SandboxError::ContextMismatch { .. })));
    }

    #[tokio::test]
    async fn missing_member_is_unsupported_on_use_only() {
        let context = context_with_exports(
            "4.3.0",
            VERSIONING_ASSEMBLY,
            &[
                members::VERSION_PARSE,
                members::VERSION_NORMALIZED_STRING,
                members::VERSION_TO_STRING,
            ],
        )
        .await;
        let logic = bind_all(&context).unwrap();
        let a = logic.version.parse("1.0.0").unwrap();
        let b = logic.version.parse("2.0.0").unwrap();

        assert!(!logic.version.is_semver2_available());
        assert!(matches!(
            logic.version.compare(&a, &b),
            Err(SandboxError::Unsupported { capability, .. }) if capability == members::VERSION_COMPARE
        ));
    }

    #[tokio::test]
    async fn legacy_has_no_optional_range_capabilities() {
        let logic = bind_all(&*context("2.14.0").await).unwrap();
        let range = logic.range.parse("[1.0, 2.0)").unwrap();
        let version = logic.version.parse("1.5").unwrap();

        assert_eq!(range.pretty_print(), "(≥ 1.0 && < 2.0)");
        assert!(!range.is_floating_available());
        assert!(!range.legacy_short_string_available());
        assert!(matches!(
            logic.range.is_better(&range, &version, &version),
            Err(SandboxError::Unsupported { capability: "IsBetter", .. })
        ));
    }
}
