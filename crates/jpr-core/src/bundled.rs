//! Reconcile a project lock with the plugins a base distribution bundles
//!
//! Jenkins ignores a plugin in the plugins directory when the WAR bundles a
//! newer copy of it, so the lock must never hold a version older than the
//! bundled one.

use crate::incompatibility::{Incompatibilities, Incompatibility};
use crate::plugin::{LockRegistry, PluginCoordinate};
use crate::version::VersionOrdering;
use crate::{Error, Result};

/// Merge `bundled_lock` into `user_lock`.
///
/// For every bundled plugin:
///
/// - not in the user lock: it is added
/// - bundled no newer than the user lock: the user lock is kept
/// - bundled newer, plugin listed in `requested`: reported, the user must
///   update the project file
/// - bundled newer, plugin only pulled in as a dependency: the bundled
///   version replaces the locked one
///
/// The user lock ends up sorted by name. Version comparison failures are
/// collected and returned together after every plugin was considered.
pub fn reconcile(
    requested: &[PluginCoordinate],
    bundled_lock: &LockRegistry,
    user_lock: &mut LockRegistry,
    ordering: &VersionOrdering,
) -> Result<Incompatibilities> {
    let mut found = Incompatibilities::new();
    let mut errors = Vec::new();

    for bundled in &bundled_lock.plugins {
        let Some(locked) = user_lock.get_mut(&bundled.name) else {
            tracing::info!(plugin = %bundled, "Adding bundled plugin to the lock");
            user_lock.plugins.push(bundled.clone());
            continue;
        };

        if locked.version == bundled.version {
            continue;
        }
        match ordering.lower(&bundled.version, &locked.version) {
            Ok(true) => continue,
            Ok(false) => {}
            Err(e) => {
                errors.push(e.for_plugin(bundled.identifier()));
                continue;
            }
        }

        match requested.iter().find(|r| r.same_plugin(bundled)) {
            Some(request) => found.push(Incompatibility {
                plugin: request.clone(),
                cause: format!(
                    "a newer version was bundled in the base distribution, please update your project file or remove {} from it",
                    locked.identifier()
                ),
                requesters: vec![format!(
                    "{}: {} -> {}",
                    bundled.name, locked.version, bundled.version
                )],
            }),
            None => {
                tracing::info!(
                    plugin = %bundled.name,
                    locked = %locked.version,
                    bundled = %bundled.version,
                    "Replacing locked version with the newer bundled one"
                );
                *locked = bundled.clone();
            }
        }
    }

    user_lock.sort();
    Error::from_batch(errors)?;
    Ok(found)
}
