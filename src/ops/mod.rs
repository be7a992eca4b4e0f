//! High-level operations.
//!
//! This module contains the implementation of Stencil commands.

pub mod generate;
pub mod init;
pub mod resolve;

pub use generate::{check, generate, plan, GenerateOptions, GenerateResult, PlannedUnit};
pub use init::init_manifest;
pub use resolve::{format_report, resolve_target, ResolveReport};
