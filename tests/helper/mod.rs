//! Shared integration test utilities

#![allow(dead_code)]

pub mod store;

pub use store::{CountingLocator, create_test_factory, create_test_store, release};
