//! `stencil list` command

use anyhow::Result;

use crate::cli::ListArgs;
use stencil::core::Manifest;
use stencil::util::GlobalContext;

pub fn execute(args: ListArgs) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let manifest = Manifest::load(&ctx.find_manifest()?)?;

    if args.targets {
        for target in &manifest.targets {
            println!(
                "{:<24} {:<10} {}",
                target.name,
                target.kind.to_string(),
                target.output.display()
            );
        }
        return Ok(());
    }

    for cap in manifest.registry.iter() {
        let path = cap.to_ref().import_path().unwrap_or_else(|| cap.name.clone());
        if cap.embeds.is_empty() {
            println!("{} ({} methods)", path, cap.methods.len());
        } else {
            println!(
                "{} ({} methods, embeds {})",
                path,
                cap.methods.len(),
                cap.embeds.join(", ")
            );
        }
    }

    Ok(())
}
