//! `stencil resolve` command

use anyhow::Result;

use crate::cli::ResolveArgs;
use stencil::core::Manifest;
use stencil::ops::{format_report, resolve_target};
use stencil::util::GlobalContext;

pub fn execute(args: ResolveArgs) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let manifest = Manifest::load(&ctx.find_manifest()?)?;

    let report = resolve_target(&manifest, &args.target)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", format_report(&report));
    }

    Ok(())
}
