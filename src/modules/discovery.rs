//! Filesystem discovery of module folders.
//!
//! A folder under the modules root participates when its name starts with
//! a numeric prefix before the first `_` and it contains a `module.toml`.
//! Everything else is skipped. A folder that looks like a module but has a
//! broken manifest or an unresolvable install key is excluded with an
//! error line; exclusion never aborts discovery.

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::DiscoveryError;
use crate::logging::Log;

use super::manifest::{MANIFEST_FILE, ModuleManifest};
use super::{InstallFn, ModuleDescriptor};

/// Parse a module folder's order number.
///
/// The order is the folder-name text before the first `_` (or the whole
/// name when there is no `_`), parsed as `u32`. Returns `None` for names
/// without a numeric prefix; such folders are not modules.
#[must_use]
pub fn parse_order(name: &str) -> Option<u32> {
    let prefix = name.split('_').next().unwrap_or(name);
    prefix.parse().ok()
}

/// Registry key for a module folder, before consulting the manifest.
///
/// `110_power` defaults to `power`; a bare numeric name has no default
/// and must name its install key in the manifest.
fn default_key(name: &str) -> Option<&str> {
    name.split_once('_').map(|(_, suffix)| suffix)
}

/// Scan `root` and resolve every module folder against `registry`.
///
/// Returns descriptors sorted ascending by `(order, name)`. Duplicate
/// orders are *not* rejected here; callers validate via
/// [`super::validate_unique_orders`] before running anything.
///
/// A missing or unreadable `root` yields an empty list with a warning,
/// matching the behaviour of a root that contains no modules.
#[must_use]
pub fn discover(
    root: &Path,
    registry: &BTreeMap<&'static str, InstallFn>,
    log: &dyn Log,
) -> Vec<ModuleDescriptor> {
    let entries = match std::fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) => {
            log.warn(&format!(
                "cannot read modules root {}: {e}",
                root.display()
            ));
            return Vec::new();
        }
    };

    let mut modules = Vec::new();
    for entry in entries {
        let Ok(entry) = entry else { continue };
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        let Some(order) = parse_order(&name) else {
            log.debug(&format!("skipping '{name}': no numeric prefix"));
            continue;
        };
        if !path.join(MANIFEST_FILE).is_file() {
            log.warn(&format!("module '{name}' has no {MANIFEST_FILE}, skipping"));
            continue;
        }
        match resolve(&path, &name, registry) {
            Ok((install, description)) => modules.push(ModuleDescriptor {
                order,
                name,
                dir: path,
                description,
                install,
            }),
            Err(e) => log.error(&format!("excluding module: {e}")),
        }
    }

    modules.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.name.cmp(&b.name)));
    modules
}

/// Load the manifest and look up the install entry point.
fn resolve(
    dir: &Path,
    name: &str,
    registry: &BTreeMap<&'static str, InstallFn>,
) -> Result<(InstallFn, Option<String>), DiscoveryError> {
    let manifest = ModuleManifest::load(dir, name)?;
    let key = manifest
        .install
        .as_deref()
        .or_else(|| default_key(name))
        .unwrap_or("");
    let install = registry
        .get(key)
        .copied()
        .ok_or_else(|| DiscoveryError::UnknownInstall {
            module: name.to_string(),
            key: key.to_string(),
        })?;
    Ok((install, manifest.description))
}
