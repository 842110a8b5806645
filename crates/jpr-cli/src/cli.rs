//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Jenkins plugins resolver - lock a plugin set to one version per plugin
#[derive(Parser, Debug)]
#[command(name = "jpr")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Resolve a project file into a lock file
    ///
    /// Fetches every transitive plugin manifest, picks the newest required
    /// version of each plugin and reports requested versions that are too old.
    ///
    /// Examples:
    ///   jpr resolve -i plugins.yaml                 # writes plugins-lock.json
    ///   jpr resolve -i plugins.json --war jenkins.war
    ///   jpr resolve -i plugins.toml --show-graph --strict
    Resolve {
        /// Project file listing the requested plugins (json, yaml or toml)
        #[arg(short, long)]
        input: PathBuf,

        /// Cache directory [default: ~/.jpr]
        #[arg(short, long, env = "JPR_WORKING_DIR")]
        working_dir: Option<PathBuf>,

        /// Lock file to write [default: <input>-lock.json next to the input]
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Jenkins WAR whose bundled plugins are reconciled with the lock
        #[arg(long)]
        war: Option<PathBuf>,

        /// Lock optional dependencies too
        #[arg(long)]
        optional: bool,

        /// Print the dependency graph as JSON
        #[arg(long)]
        show_graph: bool,

        /// Number of concurrent downloads
        #[arg(long)]
        workers: Option<usize>,

        /// Fail when incompatibilities are found
        #[arg(long)]
        strict: bool,
    },

    /// Download the artifacts of a lock file
    ///
    /// Examples:
    ///   jpr download -i plugins-lock.json -d plugins/
    Download {
        /// Lock file written by `jpr resolve`
        #[arg(short, long)]
        input: PathBuf,

        /// Cache directory [default: ~/.jpr]
        #[arg(short, long, env = "JPR_WORKING_DIR")]
        working_dir: Option<PathBuf>,

        /// Directory receiving one `<name>.jpi` per plugin
        #[arg(short = 'd', long)]
        output_dir: PathBuf,

        /// Number of concurrent downloads
        #[arg(long)]
        workers: Option<usize>,
    },
}
