//! Bakery — chart export cache CLI.
//!
//! # Usage
//!
//! ```text
//! bakery init --site-dir <dir> --base-url <url> [--catalog <file>] [--baker <program>]
//! bakery index [--json]
//! bakery status [--json] [--file <list>] [<reference>...]
//! bakery bake [--dry-run] [--batch-size <n>] [--file <list>] [<reference>...]
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{bake::BakeArgs, index::IndexArgs, init::InitArgs, status::StatusArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "bakery",
    version,
    about = "Keep baked chart exports in step with their chart versions",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write ~/.bakery/settings.yaml.
    Init(InitArgs),

    /// List the latest export per key in the exports directory.
    Index(IndexArgs),

    /// Show which chart references are stale, without baking.
    Status(StatusArgs),

    /// Bake stale chart references in batches.
    Bake(BakeArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Commands::Init(args) => args.run(),
        Commands::Index(args) => args.run(),
        Commands::Status(args) => args.run(),
        Commands::Bake(args) => args.run(),
    }
}

/// Diagnostics go to stderr so `--json` output stays parseable.
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
