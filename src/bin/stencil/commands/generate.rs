//! `stencil generate` command

use anyhow::Result;

use super::load_generation;
use crate::cli::GenerateArgs;
use stencil::ops::generate;
use stencil::util::fs::relative_path;

pub fn execute(args: GenerateArgs) -> Result<()> {
    let (manifest, opts) = load_generation(&args)?;

    let result = generate(&manifest, &opts)?;

    for path in &result.written {
        eprintln!(
            "   Generated {}",
            relative_path(&manifest.manifest_dir, path).display()
        );
    }
    eprintln!(
        "    Finished {} written, {} unchanged",
        result.written.len(),
        result.unchanged.len()
    );

    Ok(())
}
