//! Method set resolution.
//!
//! Resolution is pure and deterministic: all capability metadata comes from
//! a [`MetadataProvider`](crate::core::registry::MetadataProvider) and the
//! same inputs always produce the same ordered set.

pub mod cycles;
pub mod errors;
pub mod exclude;
pub mod method_set;
pub mod resolve;

pub use cycles::check_cycles;
pub use errors::GenerateError;
pub use exclude::{NameExcluder, PatternExcluder};
pub use method_set::MethodSet;
pub use resolve::{ExclusionSpec, MethodSetResolver};
