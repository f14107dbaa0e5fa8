//! Isolation contexts
//!
//! A context holds the modules of exactly one release. Modules are loaded from
//! the installed packages, each into its own member table, so two releases that
//! expose identically named members never see each other's.
//!
//! # Modules
//!
//! - [`context`]: Context, context id, loaded modules and adapter lines
//! - [`manager`]: Per-release context cache with single in-flight builds
//! - [`manifest`]: Package file listing and module descriptors
//! - [`target`]: Runtime target selection among a package's lib groups

pub mod context;
pub mod manager;
pub mod manifest;
pub mod target;

pub use context::{AdapterLine, ContextId, IsolationContext, LoadedModule};
pub use manager::ContextManager;

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use tempfile::TempDir;

    use super::{ContextManager, IsolationContext, target::TargetSelector};
    use crate::isolation::manifest::ModuleDescriptor;
    use crate::release::ReleaseId;
    use crate::release::store::LocalPackageStore;

    /// Context for `release` built from a throwaway package store
    pub async fn context(release: &str) -> Arc<IsolationContext> {
        let temp_dir = TempDir::new().unwrap();
        let release = ReleaseId::parse(release).unwrap();
        let store = LocalPackageStore::new(temp_dir.path());
        store.install_release(&release, "net45").unwrap();
        ContextManager::new(Arc::new(store), TargetSelector::default())
            .get_or_create(&release)
            .await
            .unwrap()
    }

    /// Context whose `assembly` module only exports `exports`
    pub async fn context_with_exports(
        release: &str,
        assembly: &str,
        exports: &[&str],
    ) -> Arc<IsolationContext> {
        let temp_dir = TempDir::new().unwrap();
        let release = ReleaseId::parse(release).unwrap();
        let store = LocalPackageStore::new(temp_dir.path());
        store.install_release(&release, "net45").unwrap();
        let descriptor =
            ModuleDescriptor::new(assembly, &release).with_exports(exports.iter().copied());
        store
            .install_module(assembly, &release, "net45", &descriptor)
            .unwrap();
        ContextManager::new(Arc::new(store), TargetSelector::default())
            .get_or_create(&release)
            .await
            .unwrap()
    }
}
