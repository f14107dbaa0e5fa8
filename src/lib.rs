//! Loads several mutually incompatible releases of the NuGet client libraries
//! side by side and exposes one normalized API over all of them.
//!
//! # Modules
//!
//! - [`release`]: which releases are available, locally and on feeds
//! - [`engine`]: the two library generations a loaded module can expose
//! - [`isolation`]: one cached context per release
//! - [`binding`]: logic adapters bound to a context
//! - [`facade`]: the release-independent entities and adapter traits
//! - [`derived`]: precedence, best match, catalog and batch parsing
//! - [`service`]: contracts for presentation layers

pub mod binding;
pub mod config;
pub mod derived;
pub mod engine;
pub mod error;
pub mod facade;
pub mod isolation;
pub mod logging;
pub mod release;
pub mod service;
