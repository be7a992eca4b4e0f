//! Command implementations

pub mod check;
pub mod completions;
pub mod generate;
pub mod init;
pub mod list;
pub mod resolve;

use anyhow::Result;

use stencil::core::Manifest;
use stencil::ops::GenerateOptions;
use stencil::util::GlobalContext;

use crate::cli::GenerateArgs;

/// Locate and load the manifest, then build generation options.
///
/// Command-line flags override the merged configuration.
pub fn load_generation(args: &GenerateArgs) -> Result<(Manifest, GenerateOptions)> {
    let ctx = GlobalContext::new()?;
    let manifest_path = ctx.find_manifest()?;
    let manifest = Manifest::load(&manifest_path)?;

    let config = ctx.load_config(&manifest.manifest_dir);
    let mut opts = GenerateOptions::from_config(&config).with_targets(args.target.clone());
    if let Some(jobs) = args.jobs {
        opts.jobs = jobs.max(1);
    }
    if args.check_cycles {
        opts.check_cycles = true;
    }

    Ok((manifest, opts))
}
