//! reposync: mirror repositories from one GitHub organization into others.
//!
//! # Usage
//!
//! ```text
//! reposync sync     [--config P] [--token T] [--dry-run] [--json] [--skip-verify] [--no-notify]
//! reposync verify   [--config P] [--token T]
//! reposync validate [--config P]
//!
//! global: --verbose/-v  --color auto|always|never  --log-file P
//! ```

mod commands;
mod logging;
mod notify;
mod report;

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{sync::SyncArgs, validate::ValidateArgs, verify::VerifyArgs};
use logging::LogArgs;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "reposync",
    version,
    about = "Mirror repositories' default branch and tags across GitHub organizations",
    long_about = None,
)]
struct Cli {
    #[command(flatten)]
    log: LogArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Mirror every configured repository into every target organization.
    Sync(SyncArgs),

    /// Check Actions policy in the source and target organizations.
    Verify(VerifyArgs),

    /// Load and validate the config file, then print the sync matrix.
    Validate(ValidateArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    logging::init(&cli.log)?;
    match cli.command {
        Commands::Sync(args) => args.run(),
        Commands::Verify(args) => args.run(),
        Commands::Validate(args) => args.run(),
    }
}
