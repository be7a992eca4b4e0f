//! Stencil CLI - capability-driven source generation for Rust

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use stencil::core::manifest::ManifestError;
use stencil::resolver::GenerateError;
use stencil::util::diagnostic::{emit, suggestions, Diagnostic};

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    let color = !cli.no_color;

    if let Err(e) = run(cli) {
        emit(&to_diagnostic(&e), color);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let filter = if cli.verbose {
        EnvFilter::new("stencil=debug")
    } else {
        EnvFilter::new("stencil=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .with_ansi(!cli.no_color)
        .init();

    match cli.command {
        Commands::Init(args) => commands::init::execute(args),
        Commands::Generate(args) => commands::generate::execute(args),
        Commands::Check(args) => commands::check::execute(args, !cli.no_color),
        Commands::Resolve(args) => commands::resolve::execute(args),
        Commands::List(args) => commands::list::execute(args),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}

/// The full error chain, with fix suggestions when the root cause has them.
fn to_diagnostic(e: &anyhow::Error) -> Diagnostic {
    let message = format!("{:#}", e);

    if let Some(err) = e.chain().find_map(|c| c.downcast_ref::<GenerateError>()) {
        let mut diag = err.to_diagnostic();
        diag.message = message;
        return diag;
    }

    let diag = Diagnostic::error(message);
    if e.chain().any(|c| c.downcast_ref::<ManifestError>().is_some()) {
        return diag.with_suggestion(suggestions::NO_MANIFEST.trim_start_matches("help: "));
    }
    diag
}
