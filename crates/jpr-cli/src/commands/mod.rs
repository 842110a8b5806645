//! Command implementations for jpr-cli

pub mod download;
pub mod resolve;

use std::path::PathBuf;

use jpr_core::ResolverSettings;

use crate::error::{CliError, Result};

pub use download::run_download;
pub use resolve::{ResolveOptions, run_resolve};

/// Directory under the home directory used when `--working-dir` is absent.
pub const DEFAULT_WORKING_DIR: &str = ".jpr";

/// The working directory to cache into.
pub fn working_dir(flag: Option<PathBuf>) -> Result<PathBuf> {
    match flag {
        Some(dir) => Ok(dir),
        None => dirs::home_dir()
            .map(|home| home.join(DEFAULT_WORKING_DIR))
            .ok_or_else(|| {
                CliError::user("cannot determine the home directory, pass --working-dir")
            }),
    }
}

/// Settings from the working directory with command-line overrides applied.
pub fn load_settings(
    working_dir: &std::path::Path,
    optional: bool,
    workers: Option<usize>,
) -> Result<ResolverSettings> {
    let mut settings = ResolverSettings::load(working_dir)?;
    if optional {
        settings.optional = true;
    }
    if let Some(workers) = workers {
        settings.max_workers = workers;
    }
    tracing::debug!(?settings, "Resolver settings");
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn explicit_working_dir_wins() {
        let dir = working_dir(Some(PathBuf::from("/tmp/cache"))).unwrap();
        assert_eq!(dir, PathBuf::from("/tmp/cache"));
    }

    #[test]
    fn flags_override_settings_file() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("config.toml"),
            "max_workers = 3\noptional = false\n",
        )
        .unwrap();

        let from_file = load_settings(temp.path(), false, None).unwrap();
        assert_eq!(from_file.max_workers, 3);
        assert!(!from_file.optional);

        let overridden = load_settings(temp.path(), true, Some(7)).unwrap();
        assert_eq!(overridden.max_workers, 7);
        assert!(overridden.optional);
    }
}
