//! The generation driver.
//!
//! Renders every target of a manifest into an [`EmissionUnit`] and writes
//! the results. Nothing is written until every unit rendered successfully.

use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use rayon::prelude::*;

use crate::core::registry::MetadataProvider;
use crate::core::target::{Target, TargetGenerator};
use crate::core::Manifest;
use crate::emit::marshal::MarshalGenerator;
use crate::emit::unit::EmissionUnit;
use crate::emit::wrapper::WrapperGenerator;
use crate::resolver::cycles::check_cycles;
use crate::resolver::exclude::PatternExcluder;
use crate::resolver::resolve::MethodSetResolver;
use crate::util::config::Config;

/// Options for a generation run.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Number of targets rendered in parallel
    pub jobs: usize,

    /// Cycle check for marshal targets that do not set `check_cycles`
    pub check_cycles: bool,

    /// Header file used when the manifest declares no header
    pub header_file: Option<PathBuf>,

    /// Only these targets (empty = all)
    pub targets: Vec<String>,
}

impl GenerateOptions {
    /// Options taken from the merged configuration.
    pub fn from_config(config: &Config) -> Self {
        GenerateOptions {
            jobs: config.jobs(),
            check_cycles: config.generate.check_cycles.unwrap_or(false),
            header_file: config.generate.header_file.clone(),
            targets: Vec::new(),
        }
    }

    /// Restrict the run to the named targets.
    pub fn with_targets(mut self, targets: Vec<String>) -> Self {
        self.targets = targets;
        self
    }
}

/// A rendered unit and where it goes.
#[derive(Debug, Clone)]
pub struct PlannedUnit {
    /// Name of the target that produced the unit
    pub target: String,

    /// Absolute destination path
    pub path: PathBuf,

    pub unit: EmissionUnit,
}

/// Outcome of a generation run.
#[derive(Debug, Default)]
pub struct GenerateResult {
    /// Files that were (re)written
    pub written: Vec<PathBuf>,

    /// Files that already held the generated text
    pub unchanged: Vec<PathBuf>,
}

/// Render every selected target without touching the filesystem.
pub fn plan(manifest: &Manifest, opts: &GenerateOptions) -> Result<Vec<PlannedUnit>> {
    let targets = select_targets(manifest, &opts.targets)?;
    let header = header_text(manifest, opts)?;

    let render = |target: &&Target| -> Result<PlannedUnit> {
        let unit = render_target(manifest, target, &header, opts.check_cycles)
            .with_context(|| target.stage())?;
        Ok(PlannedUnit {
            target: target.name.clone(),
            path: manifest.output_path(target),
            unit,
        })
    };

    if opts.jobs > 1 && targets.len() > 1 {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(opts.jobs)
            .build()
            .context("failed to start worker threads")?;
        pool.install(|| targets.par_iter().map(render).collect())
    } else {
        targets.iter().map(render).collect()
    }
}

/// Render one target.
pub fn render_target(
    manifest: &Manifest,
    target: &Target,
    header: &str,
    check_cycles_default: bool,
) -> Result<EmissionUnit> {
    let provider = &manifest.registry;
    let context = manifest.unit_context(target, header);
    let exclusions = target.exclusions()?;
    let set = MethodSetResolver::new(provider).resolve(&target.include, &exclusions)?;

    let unit = match &target.generator {
        TargetGenerator::Wrapper { spec, behavior } => {
            // Capabilities that lose methods to an exclusion get no empty impl
            let mut excluded: HashSet<String> = exclusions.capabilities.iter().cloned().collect();
            for name in &exclusions.capabilities {
                for method in provider.describe_capability(name)? {
                    excluded.insert(method.owner.name);
                }
            }

            let mut spec = spec.clone();
            for name in &target.include {
                if excluded.contains(name) {
                    continue;
                }
                let cap = provider.capability(name)?;
                if !spec.implements.contains(&cap) {
                    spec.implements.push(cap);
                }
            }
            let unit = WrapperGenerator::new(&spec, behavior).generate(&set, &context)?;
            unit
        }
        TargetGenerator::Marshal {
            spec,
            field_excludes,
        } => {
            let mut spec = spec.clone();
            spec.receiver = provider.capability(&spec.receiver.name)?;

            if target.check_cycles.unwrap_or(check_cycles_default) {
                check_cycles(provider, &spec.receiver.name, &set)?;
            }

            let names = PatternExcluder::new(field_excludes)?;
            let unit = MarshalGenerator::new(&spec)
                .with_names(names)
                .generate(&set, &context)?;
            unit
        }
    };

    Ok(unit)
}

/// Render every target, then write the units whose files changed.
pub fn generate(manifest: &Manifest, opts: &GenerateOptions) -> Result<GenerateResult> {
    let units = plan(manifest, opts)?;

    let mut result = GenerateResult::default();
    for planned in units {
        if planned.unit.is_current(&planned.path)? {
            tracing::debug!("{} is up to date", planned.path.display());
            result.unchanged.push(planned.path);
            continue;
        }
        planned.unit.write_to(&planned.path)?;
        tracing::info!("Generated {} ({})", planned.path.display(), planned.target);
        result.written.push(planned.path);
    }

    Ok(result)
}

/// Render every target and report the ones whose files are missing or stale.
pub fn check(manifest: &Manifest, opts: &GenerateOptions) -> Result<Vec<PlannedUnit>> {
    let mut stale = Vec::new();
    for planned in plan(manifest, opts)? {
        if !planned.unit.is_current(&planned.path)? {
            stale.push(planned);
        }
    }
    Ok(stale)
}

fn select_targets<'m>(manifest: &'m Manifest, names: &[String]) -> Result<Vec<&'m Target>> {
    if names.is_empty() {
        return Ok(manifest.targets.iter().collect());
    }

    names
        .iter()
        .map(|name| match manifest.target(name) {
            Some(target) => Ok(target),
            None => bail!("no target named `{}` in {}", name, crate::core::MANIFEST_NAME),
        })
        .collect()
}

fn header_text(manifest: &Manifest, opts: &GenerateOptions) -> Result<String> {
    let declared = manifest.generator.header.is_some() || manifest.generator.header_file.is_some();
    match &opts.header_file {
        Some(file) if !declared => {
            let path = manifest.manifest_dir.join(file);
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read header file: {}", path.display()))?;
            Ok(text.trim_end().to_string())
        }
        _ => manifest.header(),
    }
}
