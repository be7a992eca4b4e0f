//! `stencil init` command

use std::path::PathBuf;

use anyhow::Result;

use crate::cli::InitArgs;
use stencil::ops::init_manifest;

pub fn execute(args: InitArgs) -> Result<()> {
    let path = args.path.unwrap_or_else(|| PathBuf::from("."));

    let manifest_path = init_manifest(&path, &args.module)?;
    eprintln!("     Created {}", manifest_path.display());

    Ok(())
}
