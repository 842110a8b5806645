//! Download command implementation

use std::path::{Path, PathBuf};

use colored::Colorize;
use jpr_core::{LockRegistry, Resolver};
use jpr_fs::{ConfigStore, io};

use super::{load_settings, working_dir};
use crate::error::Result;

/// Run the download command against the update center
pub async fn run_download(
    input: &Path,
    working_dir_flag: Option<PathBuf>,
    output_dir: &Path,
    workers: Option<usize>,
) -> Result<()> {
    let working_dir = working_dir(working_dir_flag)?;
    let settings = load_settings(&working_dir, false, workers)?;
    let resolver = Resolver::with_update_center(&working_dir, settings)?;

    let copied = download_with(&resolver, input, output_dir).await?;

    println!(
        "{} {} plugins into {}",
        "Downloaded".green().bold(),
        copied.len(),
        output_dir.display()
    );
    Ok(())
}

/// Fetch every locked artifact into the cache, then copy each one to
/// `<output_dir>/<name>.jpi`.
pub async fn download_with(
    resolver: &Resolver,
    input: &Path,
    output_dir: &Path,
) -> Result<Vec<PathBuf>> {
    let lock: LockRegistry = ConfigStore::new().load(input)?;
    let cached = resolver.fetch_artifacts(&lock.plugins).await?;

    let mut copied = Vec::with_capacity(cached.len());
    let mut errors = Vec::new();
    for (plugin, source) in lock.plugins.iter().zip(&cached) {
        let target = output_dir.join(format!("{}.jpi", plugin.name));
        match io::copy_atomic(source, &target) {
            Ok(()) => {
                tracing::debug!(plugin = %plugin, path = %target.display(), "Copied artifact");
                copied.push(target);
            }
            Err(e) => errors.push(jpr_core::Error::from(e).for_plugin(plugin.identifier())),
        }
    }
    jpr_core::Error::from_batch(errors)?;

    Ok(copied)
}
