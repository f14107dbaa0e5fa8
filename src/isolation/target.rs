//! Runtime target selection
//!
//! The host can only load binaries compiled for certain target frameworks. The
//! selector walks the preference list in order. For each preferred framework it
//! keeps the lib groups that framework can consume and picks the nearest one, so
//! a package shipping `net45` and `netstandard1.3` binaries loads the `net45`
//! ones on a `net472` host, and a `net451`-only package still loads.

use tracing::debug;

use crate::engine::modern::NuGetFramework;
use crate::engine::modern::framework;
use crate::engine::modern::reducer::get_nearest;
use crate::isolation::manifest::{LibGroup, PackageManifest};

struct Preference {
    folder: String,
    framework: Option<NuGetFramework>,
}

impl Preference {
    fn new(folder: &str) -> Self {
        Self {
            folder: folder.to_string(),
            framework: framework::parse(folder)
                .ok()
                .filter(|f| !f.is_unsupported()),
        }
    }

    /// Nearest group this preference can load
    fn nearest<'a>(&self, groups: &[(&'a LibGroup, NuGetFramework)]) -> Option<&'a LibGroup> {
        let Some(preferred) = &self.framework else {
            return groups
                .iter()
                .find(|(group, _)| self.folder.eq_ignore_ascii_case(&group.target_framework))
                .map(|(group, _)| *group);
        };

        let candidates: Vec<NuGetFramework> = groups.iter().map(|(_, f)| f.clone()).collect();
        let nearest = get_nearest(preferred, &candidates)?;
        groups
            .iter()
            .find(|(_, f)| *f == nearest)
            .map(|(group, _)| *group)
    }
}

pub struct TargetSelector {
    preference: Vec<Preference>,
}

impl TargetSelector {
    pub fn new<S: AsRef<str>>(preference: &[S]) -> Self {
        Self {
            preference: preference.iter().map(|p| Preference::new(p.as_ref())).collect(),
        }
    }

    /// Best lib group for the host, or None when no preferred target can load any
    pub fn select<'a>(&self, manifest: &'a PackageManifest) -> Option<&'a LibGroup> {
        let groups: Vec<(&LibGroup, NuGetFramework)> = manifest
            .lib_groups
            .iter()
            .filter_map(|group| match framework::parse(&group.target_framework) {
                Ok(parsed) if !parsed.is_unsupported() => Some((group, parsed)),
                _ => {
                    debug!("Ignoring lib/{}: unknown target framework", group.target_framework);
                    None
                }
            })
            .collect();

        for preference in &self.preference {
            if let Some(group) = preference.nearest(&groups) {
                debug!("Selected lib/{} (preferred {})", group.target_framework, preference.folder);
                return Some(group);
            }
        }
        None
    }
}

impl Default for TargetSelector {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_TARGET_PREFERENCE)
    }
}
