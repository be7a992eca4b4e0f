//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// Stencil - capability-driven source generation for Rust
#[derive(Parser)]
#[command(name = "stencil")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a Stencil.toml in an existing directory
    Init(InitArgs),

    /// Generate every target declared in Stencil.toml
    Generate(GenerateArgs),

    /// Fail if any generated file is missing or out of date
    Check(GenerateArgs),

    /// Show the resolved method set of a target
    Resolve(ResolveArgs),

    /// List declared capabilities and targets
    List(ListArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct InitArgs {
    /// Directory to initialize (defaults to current directory)
    pub path: Option<PathBuf>,

    /// Module generated files are compiled into
    #[arg(long, default_value = "crate")]
    pub module: String,
}

#[derive(Args)]
pub struct GenerateArgs {
    /// Only generate these targets
    #[arg(short, long)]
    pub target: Vec<String>,

    /// Number of targets rendered in parallel
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Check marshal targets for method cycles
    #[arg(long)]
    pub check_cycles: bool,
}

#[derive(Args)]
pub struct ResolveArgs {
    /// Target to resolve
    pub target: String,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct ListArgs {
    /// List targets instead of capabilities
    #[arg(long)]
    pub targets: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: Shell,
}
