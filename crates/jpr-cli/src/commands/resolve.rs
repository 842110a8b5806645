//! Resolve command implementation

use std::path::{Path, PathBuf};

use colored::Colorize;
use jpr_core::{Graph, Project, Resolution, Resolver};
use jpr_fs::ConfigStore;

use super::{load_settings, working_dir};
use crate::error::{CliError, Result};

/// Flags of `jpr resolve`.
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    pub input: PathBuf,
    pub working_dir: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub war: Option<PathBuf>,
    pub optional: bool,
    pub show_graph: bool,
    pub workers: Option<usize>,
    pub strict: bool,
}

/// Run the resolve command against the update center
pub async fn run_resolve(options: ResolveOptions) -> Result<()> {
    let working_dir = working_dir(options.working_dir.clone())?;
    let settings = load_settings(&working_dir, options.optional, options.workers)?;
    let resolver = Resolver::with_update_center(&working_dir, settings)?;

    let (output, resolution) = resolve_with(&resolver, &options).await?;

    println!(
        "{} {} plugins to {}",
        "Locked".green().bold(),
        resolution.lock.len(),
        output.display()
    );

    if !resolution.incompatibilities.is_empty() && options.strict {
        return Err(CliError::user(format!(
            "{} incompatible plugin requests (see warnings above)",
            resolution.incompatibilities.len()
        )));
    }
    Ok(())
}

/// Resolve the project, write the lock and report incompatibilities.
///
/// The lock is written even when incompatibilities are found.
pub async fn resolve_with(
    resolver: &Resolver,
    options: &ResolveOptions,
) -> Result<(PathBuf, Resolution)> {
    let documents = ConfigStore::new();
    let project: Project = documents.load(&options.input)?;
    let requested = project.requested();
    if requested.is_empty() {
        return Err(CliError::user(format!(
            "no plugins requested in {}",
            options.input.display()
        )));
    }

    let bundled = match &options.war {
        Some(war) => {
            let distribution = resolver.read_distribution(war)?;
            tracing::info!(
                version = %distribution.version,
                plugins = distribution.plugins.len(),
                "Base distribution"
            );
            distribution.bundled_coordinates()
        }
        None => Vec::new(),
    };

    let resolution = resolver.resolve(&requested, &bundled).await?;

    if options.show_graph {
        println!("{}", graph_dump(&resolution.graph)?);
    }

    if !resolution.incompatibilities.is_empty() {
        tracing::warn!(
            count = resolution.incompatibilities.len(),
            "Incompatibilities found:\n{}",
            resolution.incompatibilities
        );
    }

    let output = options
        .output
        .clone()
        .unwrap_or_else(|| default_output(&options.input));
    documents.save(&output, &resolution.lock)?;
    tracing::info!(path = %output.display(), plugins = resolution.lock.len(), "Lock written");

    Ok((output, resolution))
}

/// The graph as pretty JSON, in the layout of the cached `.graph` entries.
pub fn graph_dump(graph: &Graph) -> Result<String> {
    Ok(serde_json::to_string_pretty(graph).map_err(jpr_core::Error::from)?)
}

/// `<stem>-lock.json` next to the project file.
pub fn default_output(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "plugins".to_string());
    input.with_file_name(format!("{stem}-lock.json"))
}
