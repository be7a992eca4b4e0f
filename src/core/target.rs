//! Generation targets - what gets emitted.
//!
//! A Target names one output file, the capabilities whose methods it is
//! built from, and the generator that renders them.

use std::fmt;
use std::path::PathBuf;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::emit::behavior::WrapperBehavior;
use crate::emit::marshal::MarshalSpec;
use crate::emit::wrapper::{WrapperMode, WrapperSpec};
use crate::resolver::errors::GenerateError;
use crate::resolver::exclude::PatternExcluder;
use crate::resolver::resolve::ExclusionSpec;

/// The kind of unit a target produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetKind {
    /// Delegating wrapper with injected behavior
    #[serde(alias = "deprecated")]
    Wrapper,

    /// Wrapper that warns and returns default values
    #[serde(alias = "zero")]
    ZeroValue,

    /// Aggregating JSON serializer
    #[serde(alias = "json")]
    Marshal,
}

impl TargetKind {
    /// Short description used in error context.
    pub fn description(&self) -> &'static str {
        match self {
            TargetKind::Wrapper => "wrappers",
            TargetKind::ZeroValue => "zero-value wrappers",
            TargetKind::Marshal => "JSON serializer",
        }
    }

    /// Check if this kind emits a wrapper struct.
    pub fn is_wrapper(&self) -> bool {
        matches!(self, TargetKind::Wrapper | TargetKind::ZeroValue)
    }

    /// Wrapper mode for wrapper kinds.
    pub fn wrapper_mode(&self) -> Option<WrapperMode> {
        match self {
            TargetKind::Wrapper => Some(WrapperMode::Delegate),
            TargetKind::ZeroValue => Some(WrapperMode::ZeroValue),
            TargetKind::Marshal => None,
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetKind::Wrapper => write!(f, "wrapper"),
            TargetKind::ZeroValue => write!(f, "zero-value"),
            TargetKind::Marshal => write!(f, "marshal"),
        }
    }
}

/// Generator-specific settings of a target.
#[derive(Debug, Clone)]
pub enum TargetGenerator {
    Wrapper {
        spec: WrapperSpec,
        behavior: WrapperBehavior,
    },

    Marshal {
        spec: MarshalSpec,

        /// Methods left out of the document, matched by name
        field_excludes: Vec<String>,
    },
}

/// A generation target with its configuration.
#[derive(Debug, Clone)]
pub struct Target {
    /// Target name, unique within a manifest
    pub name: String,

    pub kind: TargetKind,

    /// Output path, relative to the manifest directory
    pub output: PathBuf,

    /// Module the output is compiled into; overrides `[generator] module`
    pub module: Option<String>,

    /// Included capabilities, in order
    pub include: Vec<String>,

    /// Excluded capabilities
    pub exclude: Vec<String>,

    /// Method name patterns removed during resolution
    pub exclude_names: Vec<String>,

    /// Fail when a serialized method leads back to the receiver
    pub check_cycles: Option<bool>,

    pub generator: TargetGenerator,
}

impl Target {
    /// The exclusion spec used to resolve this target's method set.
    pub fn exclusions(&self) -> Result<ExclusionSpec, GenerateError> {
        let names = PatternExcluder::new(&self.exclude_names)?;
        Ok(ExclusionSpec::capabilities(self.exclude.iter().cloned()).with_names(names))
    }

    /// Error context for a failure while generating this target.
    pub fn stage(&self) -> String {
        format!(
            "failed to generate {} for `{}`",
            self.kind.description(),
            self.include.join("`, `")
        )
    }

    /// Check the target for configuration errors that parsing cannot catch.
    pub fn validate(&self) -> Result<()> {
        if self.include.is_empty() {
            bail!("target `{}` must include at least one capability", self.name);
        }

        if self.output.as_os_str().is_empty() {
            bail!("target `{}` has an empty output path", self.name);
        }

        if self.output.is_absolute() {
            bail!(
                "target `{}`: output path must be relative to the manifest, got {}",
                self.name,
                self.output.display()
            );
        }

        match (&self.kind, &self.generator) {
            (TargetKind::Marshal, TargetGenerator::Marshal { .. }) => {}
            (kind, TargetGenerator::Wrapper { .. }) if kind.is_wrapper() => {}
            (kind, _) => bail!(
                "target `{}`: generator settings do not match kind `{}`",
                self.name,
                kind
            ),
        }

        if self.check_cycles == Some(true) && self.kind != TargetKind::Marshal {
            tracing::warn!(
                "target `{}`: check_cycles only applies to marshal targets and is ignored",
                self.name
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::capability::CapabilityRef;
    use crate::core::types::TypeRef;
    use crate::emit::wrapper::FieldSpec;

    fn marshal_target() -> Target {
        Target {
            name: "page-json".to_string(),
            kind: TargetKind::Marshal,
            output: PathBuf::from("src/page/page_marshaljson.rs"),
            module: None,
            include: vec!["Page".to_string()],
            exclude: vec!["Scratcher".to_string()],
            exclude_names: vec!["^raw_".to_string()],
            check_cycles: None,
            generator: TargetGenerator::Marshal {
                spec: MarshalSpec::new("marshal_page_to_json", CapabilityRef::new("Page")),
                field_excludes: Vec::new(),
            },
        }
    }

    #[test]
    fn test_kind_serde_names() {
        #[derive(Deserialize)]
        struct Holder {
            kind: TargetKind,
        }
        let holder: Holder = toml::from_str("kind = \"zero-value\"").unwrap();
        assert_eq!(holder.kind, TargetKind::ZeroValue);
        let holder: Holder = toml::from_str("kind = \"json\"").unwrap();
        assert_eq!(holder.kind, TargetKind::Marshal);
    }

    #[test]
    fn test_stage_names_includes() {
        let mut target = marshal_target();
        target.include.push("Titled".to_string());
        assert_eq!(
            target.stage(),
            "failed to generate JSON serializer for `Page`, `Titled`"
        );
    }

    #[test]
    fn test_exclusions_compile_patterns() {
        let exclusions = marshal_target().exclusions().unwrap();
        assert_eq!(exclusions.capabilities, vec!["Scratcher"]);
        assert!(exclusions.names.is_excluded("raw_content"));
        assert!(!exclusions.names.is_excluded("content"));
    }

    #[test]
    fn test_validate_rejects_mismatched_generator() {
        let mut target = marshal_target();
        target.kind = TargetKind::Wrapper;
        assert!(target.validate().is_err());

        target.kind = TargetKind::ZeroValue;
        target.generator = TargetGenerator::Wrapper {
            spec: WrapperSpec::new("ZeroFile", FieldSpec::new("log", TypeRef::named("Logger"))),
            behavior: WrapperBehavior::default(),
        };
        assert!(target.validate().is_ok());
    }

    #[test]
    fn test_validate_requires_includes() {
        let mut target = marshal_target();
        target.include.clear();
        let err = target.validate().unwrap_err();
        assert!(err.to_string().contains("at least one capability"));
    }
}
