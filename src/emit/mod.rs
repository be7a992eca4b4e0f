//! Source emission.
//!
//! Generators turn a resolved [`MethodSet`](crate::resolver::MethodSet) into
//! declaration records ([`syntax::Item`]), which are rendered in one pass
//! and packaged with their imports as an [`EmissionUnit`].

pub mod behavior;
pub mod imports;
pub mod marshal;
pub mod syntax;
pub mod unit;
pub mod wrapper;

pub use behavior::{Advisory, AdvisoryCalls, WrapperBehavior};
pub use imports::{ImportBlock, ImportResolver};
pub use marshal::{KeyStyle, MarshalGenerator, MarshalSpec};
pub use unit::{EmissionUnit, UnitContext};
pub use wrapper::{FieldSpec, WrapperGenerator, WrapperMode, WrapperSpec};
