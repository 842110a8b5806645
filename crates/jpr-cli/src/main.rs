//! Jenkins plugins resolver CLI
//!
//! Turns a project file listing Jenkins plugins into a lock file with one
//! version per plugin, and downloads the locked plugins.
//!
//! # Environment Variables
//!
//! - `JPR_LOG`: log filter, overriding `--verbose` (e.g. `jpr_core=debug`)
//! - `JPR_WORKING_DIR`: cache directory, like `--working-dir`

mod cli;
mod commands;
mod error;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use commands::ResolveOptions;
use error::Result;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "JPR_LOG";

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(execute_command(cli.command))
}

/// Log to stderr so stdout only carries command output.
fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose)
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!("Verbose mode enabled");
}

async fn execute_command(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Resolve {
            input,
            working_dir,
            output,
            war,
            optional,
            show_graph,
            workers,
            strict,
        } => {
            commands::run_resolve(ResolveOptions {
                input,
                working_dir,
                output,
                war,
                optional,
                show_graph,
                workers,
                strict,
            })
            .await
        }
        Commands::Download {
            input,
            working_dir,
            output_dir,
            workers,
        } => commands::run_download(&input, working_dir, &output_dir, workers).await,
    }
}
