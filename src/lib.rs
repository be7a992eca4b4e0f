//! Stencil - capability-driven source generation for Rust
//!
//! This crate provides the core library functionality for Stencil:
//! method set resolution over declared capabilities, and emission of
//! delegating wrappers and aggregating JSON serializers.

pub mod core;
pub mod emit;
pub mod ops;
pub mod resolver;
pub mod util;

/// Test fixtures for Stencil unit tests.
///
/// This module is only available when compiling with `--cfg test`.
#[cfg(test)]
pub mod test_support;

pub use core::{
    capability::Capability, manifest::Manifest, registry::CapabilityRegistry,
    registry::MetadataProvider, target::Target, types::TypeRef,
};

pub use emit::EmissionUnit;
pub use resolver::{GenerateError, MethodSet, MethodSetResolver};
pub use util::context::GlobalContext;
