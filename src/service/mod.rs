//! Contracts exposed to presentation layers
//!
//! # Modules
//!
//! - [`factory`]: release listing and per-release service cache
//! - [`tools`]: parse, compatibility, comparison and best-match operations
//! - [`precedence`]: framework precedence over a release's catalog

pub mod factory;
pub mod precedence;
pub mod tools;

pub use factory::ToolsFactory;
pub use precedence::{FrameworkPrecedenceInput, FrameworkPrecedenceOutput, FrameworkPrecedenceService};
pub use tools::ToolsService;
