//! Normalized domain facade
//!
//! The release-independent surface every caller uses. Which release and which
//! binding strategy sit behind an adapter is invisible here; only the
//! capability flags tell releases apart.
//!
//! # Modules
//!
//! - [`entity`]: `Framework`, `Version` and `VersionRange`
//! - [`logic`]: `FrameworkLogic`, `VersionLogic` and `VersionRangeLogic`

pub mod entity;
pub mod logic;

use std::sync::Arc;

use serde::Serialize;

pub use entity::{Framework, Version, VersionRange};
pub use logic::{FrameworkLogic, FrameworkSource, VersionLogic, VersionRangeLogic};

use crate::isolation::ContextId;
use crate::release::ReleaseId;

/// The three adapters bound to one context
#[derive(Clone)]
pub struct LogicSet {
    pub framework: Arc<dyn FrameworkLogic>,
    pub version: Arc<dyn VersionLogic>,
    pub range: Arc<dyn VersionRangeLogic>,
}

impl LogicSet {
    pub fn context(&self) -> ContextId {
        self.framework.context()
    }

    pub fn release(&self) -> &ReleaseId {
        self.framework.release()
    }
}

/// Outcome of reading caller input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InputStatus {
    /// A required field was blank or absent
    Missing,
    /// Present but failed to parse
    Invalid,
    /// Parsed, and the result is populated
    Valid,
}
