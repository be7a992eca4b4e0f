//! Resolved method set reports.
//!
//! `stencil resolve` shows what a target is generated from: the retained
//! methods with their owners, the imports they need and, for serializers,
//! the document key of every field.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::core::registry::MetadataProvider;
use crate::core::target::{TargetGenerator, TargetKind};
use crate::core::Manifest;
use crate::emit::imports::ImportResolver;
use crate::emit::marshal::{MarshalField, MarshalGenerator};
use crate::resolver::exclude::PatternExcluder;
use crate::resolver::resolve::MethodSetResolver;

/// One method of a resolved set.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedMethod {
    pub name: String,
    pub owner: String,
    pub signature: String,
}

/// The resolved view of a target.
#[derive(Debug, Clone, Serialize)]
pub struct ResolveReport {
    pub target: String,
    pub kind: TargetKind,
    pub methods: Vec<ResolvedMethod>,
    pub imports: Vec<String>,

    /// Serialized fields, for marshal targets
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<MarshalField>>,
}

/// Resolve the method set of the target called `name`.
pub fn resolve_target(manifest: &Manifest, name: &str) -> Result<ResolveReport> {
    let target = manifest
        .target(name)
        .with_context(|| format!("no target named `{}` in {}", name, crate::core::MANIFEST_NAME))?;

    let provider = &manifest.registry;
    let set = MethodSetResolver::new(provider)
        .resolve(&target.include, &target.exclusions()?)
        .with_context(|| format!("failed to resolve target `{}`", target.name))?;

    let module = target
        .module
        .as_deref()
        .or(manifest.generator.module.as_deref());
    let imports = ImportResolver::new(module)
        .add_methods(&set)
        .add_owners(&set)
        .finish()?;

    let fields = match &target.generator {
        TargetGenerator::Marshal {
            spec,
            field_excludes,
        } => {
            let mut spec = spec.clone();
            spec.receiver = provider.capability(&spec.receiver.name)?;
            let names = PatternExcluder::new(field_excludes)?;
            let fields = MarshalGenerator::new(&spec).with_names(names).fields(&set)?;
            Some(fields)
        }
        TargetGenerator::Wrapper { .. } => None,
    };

    Ok(ResolveReport {
        target: target.name.clone(),
        kind: target.kind,
        methods: set
            .iter()
            .map(|m| ResolvedMethod {
                name: m.name.clone(),
                owner: m.owner.name.clone(),
                signature: m.signature(),
            })
            .collect(),
        imports: imports.paths().map(str::to_string).collect(),
        fields,
    })
}

/// Format a report for terminal output.
pub fn format_report(report: &ResolveReport) -> String {
    let mut out = String::new();

    out.push_str(&format!("{} ({})\n", report.target, report.kind));
    out.push('\n');
    out.push_str("methods:\n");
    for method in &report.methods {
        out.push_str(&format!("  {:<24} {}\n", method.owner, method.signature));
    }

    if !report.imports.is_empty() {
        out.push('\n');
        out.push_str("imports:\n");
        for path in &report.imports {
            out.push_str(&format!("  {}\n", path));
        }
    }

    if let Some(fields) = &report.fields {
        out.push('\n');
        out.push_str("fields:\n");
        for field in fields {
            out.push_str(&format!("  {:<24} {}()\n", field.key, field.method));
        }
    }

    out
}
