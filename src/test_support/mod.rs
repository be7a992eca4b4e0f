//! Test utilities for Stencil unit tests.
//!
//! Provides a sample manifest covering every target kind, plus helpers
//! that write it to a temporary directory and parse it back.
//!
//! # Example
//!
//! ```rust,ignore
//! use stencil::test_support::{write_manifest, PAGE_MANIFEST};
//!
//! #[test]
//! fn test_example() {
//!     let tmp = tempfile::TempDir::new().unwrap();
//!     let manifest = write_manifest(tmp.path(), PAGE_MANIFEST);
//!     assert_eq!(manifest.targets.len(), 3);
//! }
//! ```

pub mod fixtures;

pub use fixtures::*;
