//! Stencil.toml manifest parsing and schema.
//!
//! The manifest declares the capabilities (traits) generation works from
//! and the targets (output files) to generate.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use indexmap::IndexMap;
use serde::Deserialize;
use thiserror::Error;

use crate::core::capability::{Capability, CapabilityRef, MethodDecl};
use crate::core::registry::CapabilityRegistry;
use crate::core::target::{Target, TargetGenerator, TargetKind};
use crate::core::types::TypeRef;
use crate::emit::behavior::WrapperBehavior;
use crate::emit::marshal::{KeyStyle, MarshalSpec};
use crate::emit::unit::{UnitContext, DEFAULT_HEADER};
use crate::emit::wrapper::{FieldSpec, WrapperSpec};

/// Canonical manifest file name.
pub const MANIFEST_NAME: &str = "Stencil.toml";

/// Error locating a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("could not find `{}` in `{}` or any parent directory", MANIFEST_NAME, .dir.display())]
    NotFound { dir: PathBuf },
}

/// Path of the manifest in `dir`, if there is one.
pub fn find_manifest(dir: &Path) -> Option<PathBuf> {
    let path = dir.join(MANIFEST_NAME);
    path.is_file().then_some(path)
}

/// Settings shared by every target, from the `[generator]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeneratorSettings {
    /// Module generated files are compiled into
    #[serde(default)]
    pub module: Option<String>,

    /// Header text placed at the top of every generated file
    #[serde(default)]
    pub header: Option<String>,

    /// File holding the header text, relative to the manifest
    #[serde(default)]
    pub header_file: Option<PathBuf>,
}

/// The parsed Stencil.toml manifest.
#[derive(Debug, Clone)]
pub struct Manifest {
    pub generator: GeneratorSettings,

    /// Declared capabilities
    pub registry: CapabilityRegistry,

    /// Generation targets, in declaration order
    pub targets: Vec<Target>,

    /// The directory containing this manifest
    pub manifest_dir: PathBuf,
}

/// Raw manifest as deserialized from TOML.
#[derive(Debug, Deserialize)]
struct RawManifest {
    #[serde(default)]
    generator: GeneratorSettings,

    #[serde(default, rename = "capability")]
    capabilities: Vec<RawCapability>,

    #[serde(default, rename = "target")]
    targets: Vec<RawTarget>,
}

#[derive(Debug, Deserialize)]
struct RawCapability {
    name: String,

    #[serde(default)]
    module: Option<String>,

    #[serde(default)]
    embeds: Vec<String>,

    #[serde(default, rename = "method")]
    methods: Vec<MethodDecl>,
}

/// Raw target from TOML (before processing).
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTarget {
    name: String,
    kind: TargetKind,
    output: PathBuf,

    #[serde(default)]
    module: Option<String>,

    include: Vec<String>,

    #[serde(default)]
    exclude: Vec<String>,

    #[serde(default)]
    exclude_names: Vec<String>,

    #[serde(default)]
    check_cycles: Option<bool>,

    #[serde(default)]
    doc: Option<String>,

    #[serde(default)]
    imports: Vec<String>,

    // Wrapper settings
    #[serde(default, rename = "struct")]
    struct_name: Option<String>,

    #[serde(default)]
    field: Option<RawField>,

    #[serde(default)]
    constructor: Option<RawConstructor>,

    #[serde(default)]
    fixed: IndexMap<String, String>,

    #[serde(default)]
    behavior: Option<WrapperBehavior>,

    // Marshal settings
    #[serde(default)]
    function: Option<String>,

    #[serde(default)]
    receiver: Option<String>,

    #[serde(default)]
    field_excludes: Vec<String>,

    #[serde(default)]
    key_strip: Option<String>,

    #[serde(default)]
    key_style: KeyStyle,
}

#[derive(Debug, Deserialize)]
struct RawField {
    name: String,
    #[serde(rename = "type")]
    ty: TypeRef,
}

#[derive(Debug, Deserialize)]
struct RawConstructor {
    name: String,
    returns: TypeRef,
    #[serde(default)]
    doc: Option<String>,
}

impl Manifest {
    /// Load a manifest from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read manifest: {}", path.display()))?;

        Self::parse(&content, path)
    }

    /// Parse manifest content.
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        let raw: RawManifest =
            toml::from_str(content).with_context(|| format!("failed to parse {}", MANIFEST_NAME))?;

        let manifest_dir = path.parent().unwrap_or(Path::new(".")).to_path_buf();

        let mut registry = CapabilityRegistry::new();
        for raw_cap in raw.capabilities {
            let capability = Capability {
                name: raw_cap.name,
                module: raw_cap.module,
                embeds: raw_cap.embeds,
                methods: raw_cap.methods,
            };
            let name = capability.name.clone();
            if registry.insert(capability).is_some() {
                bail!("capability `{}` is declared more than once", name);
            }
        }

        if let Some((cap, embed)) = registry.dangling_embeds().into_iter().next() {
            bail!(
                "capability `{}` embeds `{}`, which is not declared",
                cap,
                embed
            );
        }

        let mut targets = Vec::new();
        let mut names = HashSet::new();
        let mut outputs = HashSet::new();
        for raw_target in raw.targets {
            let target = Self::convert_target(raw_target)?;
            if !names.insert(target.name.clone()) {
                bail!("target `{}` is declared more than once", target.name);
            }
            if !outputs.insert(target.output.clone()) {
                bail!(
                    "target `{}` writes to {}, which another target already writes",
                    target.name,
                    target.output.display()
                );
            }
            targets.push(target);
        }

        if targets.is_empty() {
            tracing::warn!("{} declares no targets", path.display());
        }

        Ok(Manifest {
            generator: raw.generator,
            registry,
            targets,
            manifest_dir,
        })
    }

    fn convert_target(raw: RawTarget) -> Result<Target> {
        let generator = match raw.kind.wrapper_mode() {
            Some(mode) => {
                let struct_name = raw.struct_name.with_context(|| {
                    format!("target `{}`: wrapper targets need `struct`", raw.name)
                })?;
                let field = raw.field.with_context(|| {
                    format!("target `{}`: wrapper targets need `field`", raw.name)
                })?;

                let mut spec =
                    WrapperSpec::new(struct_name, FieldSpec::new(field.name, field.ty)).with_mode(mode);
                if let Some(ctor) = raw.constructor {
                    spec = spec.with_constructor(ctor.name, ctor.returns, ctor.doc);
                }
                spec.fixed = raw.fixed;
                spec.imports = raw.imports;
                spec.doc = raw.doc;

                TargetGenerator::Wrapper {
                    spec,
                    behavior: raw.behavior.unwrap_or_default(),
                }
            }
            None => {
                let function = raw.function.with_context(|| {
                    format!("target `{}`: marshal targets need `function`", raw.name)
                })?;
                let receiver = match raw.receiver {
                    Some(receiver) => receiver,
                    None if raw.include.len() == 1 => raw.include[0].clone(),
                    None => bail!(
                        "target `{}`: `receiver` is required when including several capabilities",
                        raw.name
                    ),
                };

                let mut spec = MarshalSpec::new(function, CapabilityRef::new(receiver))
                    .with_key_style(raw.key_style);
                if let Some(pattern) = raw.key_strip.as_deref() {
                    spec = spec
                        .with_key_strip(pattern)
                        .with_context(|| format!("target `{}`: invalid `key_strip`", raw.name))?;
                }
                spec.doc = raw.doc;

                TargetGenerator::Marshal {
                    spec,
                    field_excludes: raw.field_excludes,
                }
            }
        };

        let target = Target {
            name: raw.name,
            kind: raw.kind,
            output: raw.output,
            module: raw.module,
            include: raw.include,
            exclude: raw.exclude,
            exclude_names: raw.exclude_names,
            check_cycles: raw.check_cycles,
            generator,
        };

        target.validate()?;

        Ok(target)
    }

    /// Get a target by name.
    pub fn target(&self, name: &str) -> Option<&Target> {
        self.targets.iter().find(|t| t.name == name)
    }

    /// Absolute output path of a target.
    pub fn output_path(&self, target: &Target) -> PathBuf {
        self.manifest_dir.join(&target.output)
    }

    /// Header text, from `header`, `header_file` or the built-in default.
    pub fn header(&self) -> Result<String> {
        if let Some(header) = &self.generator.header {
            return Ok(header.clone());
        }
        if let Some(file) = &self.generator.header_file {
            let path = self.manifest_dir.join(file);
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read header file: {}", path.display()))?;
            return Ok(text.trim_end().to_string());
        }
        Ok(DEFAULT_HEADER.to_string())
    }

    /// Unit context for `target`.
    pub fn unit_context(&self, target: &Target, header: &str) -> UnitContext {
        let module = target
            .module
            .clone()
            .or_else(|| self.generator.module.clone());
        UnitContext::new(header, module)
    }
}

/// Content of a fresh manifest with one example capability and target.
pub fn generate_default_manifest(module: &str) -> String {
    format!(
        r#"[generator]
module = "{module}"

[[capability]]
name = "Page"
module = "{module}"

[[capability.method]]
name = "title"
returns = ["String"]

[[target]]
name = "page-json"
kind = "marshal"
output = "src/page_marshal.rs"
include = ["Page"]
function = "marshal_page_to_json"
"#
    )
}
