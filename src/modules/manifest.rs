//! Module manifest (`module.toml`) parsing.

use std::path::Path;

use serde::Deserialize;

use crate::error::DiscoveryError;

/// File that marks a folder as a module and carries its metadata.
pub const MANIFEST_FILE: &str = "module.toml";

/// Per-module manifest.
///
/// Both fields are optional; an empty `module.toml` is a valid manifest
/// for a module whose install entry point matches its folder-name suffix.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleManifest {
    /// Registry key of the install entry point. Defaults to the folder
    /// name's suffix after the first `_` (e.g. `110_power` → `power`).
    pub install: Option<String>,
    /// One-line description shown by `archup list`.
    pub description: Option<String>,
}

impl ModuleManifest {
    /// Load and parse the manifest inside `dir` for the module `name`.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::ManifestIo`] if the file cannot be read
    /// and [`DiscoveryError::ManifestSyntax`] if it is not valid TOML.
    pub fn load(dir: &Path, name: &str) -> Result<Self, DiscoveryError> {
        let path = dir.join(MANIFEST_FILE);
        let text = std::fs::read_to_string(&path).map_err(|source| DiscoveryError::ManifestIo {
            module: name.to_string(),
            source,
        })?;
        toml::from_str(&text).map_err(|e| DiscoveryError::ManifestSyntax {
            module: name.to_string(),
            message: e.message().to_string(),
        })
    }
}
