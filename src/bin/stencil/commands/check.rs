//! `stencil check` command
//!
//! Renders every target without writing and fails when a generated file
//! differs from what would be generated now.

use anyhow::{bail, Result};

use super::load_generation;
use crate::cli::GenerateArgs;
use stencil::ops::check;
use stencil::util::diagnostic::{emit, suggestions, Diagnostic};
use stencil::util::fs::relative_path;

pub fn execute(args: GenerateArgs, color: bool) -> Result<()> {
    let (manifest, opts) = load_generation(&args)?;

    let stale = check(&manifest, &opts)?;
    if stale.is_empty() {
        eprintln!("    Finished all generated files are up to date");
        return Ok(());
    }

    let mut diag = Diagnostic::warning(format!("{} generated file(s) are stale", stale.len()));
    for planned in &stale {
        diag = diag.with_context(format!(
            "{} ({})",
            relative_path(&manifest.manifest_dir, &planned.path).display(),
            planned.target
        ));
    }
    emit(&diag, color);
    eprintln!("{}", suggestions::STALE_OUTPUT);

    bail!("generated files are out of date")
}
