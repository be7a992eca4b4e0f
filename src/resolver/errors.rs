//! Generation error types and diagnostics.

use std::path::PathBuf;

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::util::diagnostic::Diagnostic;

/// Error raised while resolving method sets or emitting a unit.
///
/// Every variant is fatal for the run: generation is deterministic, so
/// retrying with the same inputs reproduces the same failure.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum GenerateError {
    #[error("no methods found in {stage}")]
    #[diagnostic(code(stencil::resolve::empty_method_set))]
    EmptyMethodSet { stage: String },

    #[error("conflicting method set: `{name}` is declared as `{first}` and `{second}`")]
    #[diagnostic(code(stencil::resolve::conflicting_signature))]
    ConflictingSignature {
        name: String,
        first: String,
        second: String,
    },

    #[error("no behavior fragment registered for `{capability}.{method}`")]
    #[diagnostic(code(stencil::emit::missing_fragment))]
    MissingBehaviorFragment { method: String, capability: String },

    #[error("failed to write `{}`", .path.display())]
    #[diagnostic(code(stencil::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unknown capability `{name}`")]
    #[diagnostic(code(stencil::resolve::unknown_capability))]
    UnknownCapability {
        name: String,
        suggestions: Vec<String>,
    },

    #[error("invalid name pattern `{pattern}`")]
    #[diagnostic(code(stencil::resolve::invalid_pattern))]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid type `{text}`: {reason}")]
    #[diagnostic(code(stencil::types::invalid))]
    InvalidType { text: String, reason: String },

    #[error("conflicting imports for `{name}`: `{first}` and `{second}`")]
    #[diagnostic(code(stencil::emit::conflicting_import))]
    ConflictingImport {
        name: String,
        first: String,
        second: String,
    },

    #[error("duplicate field key `{key}` produced by `{first}` and `{second}`")]
    #[diagnostic(code(stencil::emit::duplicate_key))]
    DuplicateFieldKey {
        key: String,
        first: String,
        second: String,
    },

    #[error("method `{method}` re-enters `{receiver}`")]
    #[diagnostic(code(stencil::marshal::cycle))]
    CycleDetected {
        receiver: String,
        method: String,
        path: Vec<String>,
    },
}

impl GenerateError {
    /// Wrap an I/O failure for `path`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GenerateError::Io {
            path: path.into(),
            source,
        }
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            GenerateError::EmptyMethodSet { stage } => {
                Diagnostic::error(format!("no methods found in {}", stage))
                    .with_context("an empty unit is never valid output")
                    .with_suggestion("Check that the included capabilities declare methods")
                    .with_suggestion(
                        "Check that `exclude` and `exclude_names` do not remove every method",
                    )
            }

            GenerateError::ConflictingSignature {
                name,
                first,
                second,
            } => Diagnostic::error(format!("conflicting method set for `{}`", name))
                .with_context(format!("first declared as `{}`", first))
                .with_context(format!("also declared as `{}`", second))
                .with_suggestion("Exclude one of the declaring capabilities")
                .with_suggestion(format!(
                    "Exclude the method by name: exclude_names = [\"^{}$\"]",
                    name
                )),

            GenerateError::MissingBehaviorFragment { method, capability } => Diagnostic::error(
                format!("no behavior fragment for `{}.{}`", capability, method),
            )
            .with_suggestion(format!(
                "Add an entry under [target.behavior.methods]: {} = {{ deprecated = \"...\" }}",
                method
            ))
            .with_suggestion(format!(
                "Add a template under [target.behavior.capabilities] for `{}`",
                capability
            )),

            GenerateError::Io { path, source } => {
                Diagnostic::error(format!("failed to write `{}`", path.display()))
                    .with_context(source.to_string())
                    .with_location(path)
            }

            GenerateError::UnknownCapability { name, suggestions } => {
                let mut diag = Diagnostic::error(format!("unknown capability `{}`", name));
                if !suggestions.is_empty() {
                    diag = diag.with_context(format!("did you mean: {}?", suggestions.join(", ")));
                }
                diag.with_suggestion("Declare it with a [[capability]] entry in Stencil.toml")
            }

            GenerateError::InvalidPattern { pattern, source } => {
                Diagnostic::error(format!("invalid name pattern `{}`", pattern))
                    .with_context(source.to_string())
            }

            GenerateError::InvalidType { text, reason } => {
                Diagnostic::error(format!("invalid type `{}`", text)).with_context(reason.clone())
            }

            GenerateError::ConflictingImport {
                name,
                first,
                second,
            } => Diagnostic::error(format!("two imports are named `{}`", name))
                .with_context(format!("`{}`", first))
                .with_context(format!("`{}`", second))
                .with_suggestion("Use an unqualified type for one of them and import it manually"),

            GenerateError::DuplicateFieldKey { key, first, second } => {
                Diagnostic::error(format!("duplicate field key `{}`", key))
                    .with_context(format!("produced by `{}` and `{}`", first, second))
                    .with_suggestion("Exclude one of the methods or change `key_style`")
            }

            GenerateError::CycleDetected {
                receiver,
                method,
                path,
            } => Diagnostic::error(format!("method `{}` re-enters `{}`", method, receiver))
                .with_context(format!("cycle: {}", path.join(" -> ")))
                .with_suggestion(format!(
                    "Add the capability returning `{}` to `exclude`",
                    receiver
                )),
        }
    }
}
