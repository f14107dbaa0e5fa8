//! Isolation contexts and loaded modules

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::engine::{self, Member};
use crate::error::BuildError;
use crate::isolation::manifest::ModuleDescriptor;
use crate::release::ReleaseId;

static NEXT_CONTEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of an isolation context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ContextId(u64);

impl ContextId {
    pub fn next() -> Self {
        Self(NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ctx-{}", self.0)
    }
}

/// Adapter shipped per supported major line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AdapterLine {
    V2,
    V3,
    V4,
    V5,
    V6,
}

impl AdapterLine {
    pub fn for_release(release: &ReleaseId) -> Result<Self, BuildError> {
        match release.major() {
            2 => Ok(AdapterLine::V2),
            3 => Ok(AdapterLine::V3),
            4 => Ok(AdapterLine::V4),
            5 => Ok(AdapterLine::V5),
            6 => Ok(AdapterLine::V6),
            _ => Err(BuildError::UnsupportedLine(release.clone())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AdapterLine::V2 => "v2",
            AdapterLine::V3 => "v3",
            AdapterLine::V4 => "v4",
            AdapterLine::V5 => "v5",
            AdapterLine::V6 => "v6",
        }
    }
}

/// One binary loaded into a context, with its member table
pub struct LoadedModule {
    assembly: String,
    path: PathBuf,
    members: HashMap<&'static str, Member>,
}

impl LoadedModule {
    /// Load the module at `path`, which must be `assembly` built for `release`
    pub async fn load(path: &Path, assembly: &str, release: &ReleaseId) -> Result<Self, BuildError> {
        let descriptor = ModuleDescriptor::read(path).await?;

        if !descriptor.assembly.eq_ignore_ascii_case(assembly) {
            return Err(BuildError::InvalidModule {
                path: path.to_path_buf(),
                reason: format!("expected assembly {}, found {}", assembly, descriptor.assembly),
            });
        }
        if ReleaseId::parse(&descriptor.version).as_ref() != Some(release) {
            return Err(BuildError::VersionMismatch {
                path: path.to_path_buf(),
                release: release.clone(),
                found: descriptor.version,
            });
        }

        let exports = engine::exports(assembly, release).ok_or_else(|| BuildError::MissingAssembly {
            release: release.clone(),
            assembly: assembly.to_string(),
        })?;

        let members: HashMap<&'static str, Member> = exports
            .into_iter()
            .filter(|(name, _)| descriptor.exports_member(name))
            .collect();
        debug!("Loaded {} from {:?} with {} members", assembly, path, members.len());

        Ok(Self {
            assembly: assembly.to_string(),
            path: path.to_path_buf(),
            members,
        })
    }

    pub fn assembly(&self) -> &str {
        &self.assembly
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Member `name` with signature `T`. A missing member and a member with a
    /// different signature are both a miss.
    pub fn member<T: Any + Clone>(&self, name: &str) -> Option<T> {
        self.members.get(name)?.downcast_ref::<T>().cloned()
    }

    pub fn has_member(&self, name: &str) -> bool {
        self.members.contains_key(name)
    }

    pub fn member_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.members.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for LoadedModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedModule")
            .field("assembly", &self.assembly)
            .field("path", &self.path)
            .field("members", &self.member_names())
            .finish()
    }
}

/// Execution boundary holding one release's loaded modules.
///
/// Contexts share nothing with each other; every entity produced through a
/// context carries its [`ContextId`].
#[derive(Debug)]
pub struct IsolationContext {
    id: ContextId,
    release: ReleaseId,
    line: AdapterLine,
    target_framework: String,
    loaded_at: DateTime<Utc>,
    modules: Vec<LoadedModule>,
}

impl IsolationContext {
    pub fn new(
        release: ReleaseId,
        line: AdapterLine,
        target_framework: String,
        modules: Vec<LoadedModule>,
    ) -> Self {
        Self {
            id: ContextId::next(),
            release,
            line,
            target_framework,
            loaded_at: Utc::now(),
            modules,
        }
    }

    pub fn id(&self) -> ContextId {
        self.id
    }

    pub fn release(&self) -> &ReleaseId {
        &self.release
    }

    pub fn line(&self) -> AdapterLine {
        self.line
    }

    pub fn target_framework(&self) -> &str {
        &self.target_framework
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn modules(&self) -> &[LoadedModule] {
        &self.modules
    }

    pub fn module(&self, assembly: &str) -> Option<&LoadedModule> {
        self.modules
            .iter()
            .find(|module| module.assembly.eq_ignore_ascii_case(assembly))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::modern::{self, ParseVersionFn, members};
    use rstest::rstest;
    use tempfile::TempDir;

    fn release(s: &str) -> ReleaseId {
        ReleaseId::parse(s).unwrap()
    }

    fn write_descriptor(dir: &Path, descriptor: &ModuleDescriptor) -> PathBuf {
        let path = dir.join(format!("{}.dll", descriptor.assembly));
        std::fs::write(&path, serde_json::to_vec(descriptor).unwrap()).unwrap();
        path
    }

    #[rstest]
    #[case("2.14.0", Some(AdapterLine::V2))]
    #[case("3.5.0", Some(AdapterLine::V3))]
    #[case("6.8.0", Some(AdapterLine::V6))]
    #[case("1.0.0", None)]
    #[case("7.0.0", None)]
    fn adapter_line_follows_major(#[case] input: &str, #[case] expected: Option<AdapterLine>) {
        assert_eq!(AdapterLine::for_release(&release(input)).ok(), expected);
    }

    #[test]
    fn context_ids_are_unique() {
        assert_ne!(ContextId::next(), ContextId::next());
    }

    #[tokio::test]
    async fn load_builds_member_table() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_descriptor(
            temp_dir.path(),
            &ModuleDescriptor::new(modern::VERSIONING_ASSEMBLY, &release("4.3.0")),
        );

        let module = LoadedModule::load(&path, modern::VERSIONING_ASSEMBLY, &release("4.3.0"))
            .await
            .unwrap();

        let parse = module.member::<ParseVersionFn>(members::VERSION_PARSE).unwrap();
        assert_eq!(parse("1.0").unwrap().to_normalized_string(), "1.0.0");
        assert!(module.has_member(members::VERSION_IS_SEMVER2));
        // Right name, wrong signature
        assert!(module.member::<ParseVersionFn>(members::VERSION_COMPARE).is_none());
    }

    #[tokio::test]
    async fn load_applies_export_filter() {
        let temp_dir = TempDir::new().unwrap();
        let descriptor = ModuleDescriptor::new(modern::VERSIONING_ASSEMBLY, &release("4.3.0"))
            .with_exports([members::VERSION_PARSE, members::VERSION_COMPARE]);
        let path = write_descriptor(temp_dir.path(), &descriptor);

        let module = LoadedModule::load(&path, modern::VERSIONING_ASSEMBLY, &release("4.3.0"))
            .await
            .unwrap();

        assert_eq!(
            module.member_names(),
            vec![members::VERSION_PARSE, members::VERSION_COMPARE]
        );
    }

    #[tokio::test]
    async fn load_rejects_module_built_for_another_release() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_descriptor(
            temp_dir.path(),
            &ModuleDescriptor::new(modern::VERSIONING_ASSEMBLY, &release("4.0.0")),
        );

        let result = LoadedModule::load(&path, modern::VERSIONING_ASSEMBLY, &release("4.3.0")).await;

        assert!(matches!(result, Err(BuildError::VersionMismatch { found, .. }) if found == "4.0.0"));
    }

    #[tokio::test]
    async fn load_rejects_assembly_from_the_other_generation() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_descriptor(
            temp_dir.path(),
            &ModuleDescriptor::new(modern::VERSIONING_ASSEMBLY, &release("2.14.0")),
        );

        let result = LoadedModule::load(&path, modern::VERSIONING_ASSEMBLY, &release("2.14.0")).await;

        assert!(matches!(result, Err(BuildError::MissingAssembly { .. })));
    }
}
