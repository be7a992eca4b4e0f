//! Core data structures for Stencil.
//!
//! This module contains the foundational types used throughout Stencil:
//! - Type references and capability declarations
//! - The metadata provider seam and its registry implementation
//! - Manifests and generation targets

pub mod capability;
pub mod manifest;
pub mod registry;
pub mod target;
pub mod types;

pub use capability::{Capability, CapabilityRef, MethodDecl, MethodDescriptor};
pub use manifest::{find_manifest, Manifest, MANIFEST_NAME};
pub use registry::{CapabilityRegistry, MetadataProvider};
pub use target::{Target, TargetGenerator, TargetKind};
pub use types::TypeRef;
