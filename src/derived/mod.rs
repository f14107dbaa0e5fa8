//! Derived operations
//!
//! Algorithms written against the facade alone, so they behave the same over
//! every release. Compatibility and nearest-match semantics always come from
//! the bound release; nothing here reimplements them.
//!
//! # Modules
//!
//! - [`precedence`]: compatible candidates ordered nearest first
//! - [`best_match`]: best version for a range and the full ranking
//! - [`catalog`]: every framework a release knows about
//! - [`batch`]: newline-delimited input with per-line failures

pub mod batch;
pub mod best_match;
pub mod catalog;
pub mod precedence;

pub use batch::{BatchParse, parse_all, parse_lines};
pub use best_match::{VersionRanking, find_best_match};
pub use catalog::{FrameworkCatalog, FrameworkList};
pub use precedence::{compatible, precedence};
