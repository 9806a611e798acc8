//! Provisioning modules: registry, discovery, ordering, and execution.
//!
//! A module is a folder `<order>_<name>/` under the modules root holding a
//! `module.toml` manifest plus optional payload files. Install logic is
//! compiled in: the manifest's install key (default: the folder-name
//! suffix) resolves against [`registry`], an explicit map from key to
//! install function. Discovery produces in-memory [`ModuleDescriptor`]s;
//! the runner validates order uniqueness and executes them ascending,
//! stopping at the first failure.

/// Shared execution context passed to module install functions.
pub mod context;
pub mod discovery;
pub mod helpers;
pub mod manifest;
pub mod runner;

pub mod audio;
pub mod backup;
pub mod core;
pub mod devtools;
pub mod display_server;
pub mod firmware;
pub mod fonts;
pub mod gpu;
pub mod input;
pub mod login_manager;
pub mod network;
pub mod panels;
pub mod power;
pub mod security;
pub mod system_defaults;
pub mod theming;
pub mod window_manager;

pub use context::Context;
pub use discovery::{discover, parse_order};
pub use runner::{RunReport, run_all, validate_unique_orders};

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Result;

/// A module's compiled-in install entry point.
///
/// Receives the shared [`Context`] and the module's own payload folder.
pub type InstallFn = fn(&Context, &Path) -> Result<()>;

/// One discovered module, ready to run.
#[derive(Debug, Clone)]
pub struct ModuleDescriptor {
    /// Execution order parsed from the folder-name prefix. Globally unique
    /// across a run; validated before anything executes.
    pub order: u32,
    /// Folder name, e.g. `110_power`.
    pub name: String,
    /// Absolute path of the module folder (payload files live here).
    pub dir: PathBuf,
    /// Optional description from the manifest.
    pub description: Option<String>,
    /// Resolved install entry point.
    pub install: InstallFn,
}

/// The registry of all compiled-in install entry points.
///
/// This is the single authoritative list; a module folder whose manifest
/// resolves to a key not present here is excluded at discovery.
#[must_use]
pub fn registry() -> BTreeMap<&'static str, InstallFn> {
    let mut map: BTreeMap<&'static str, InstallFn> = BTreeMap::new();
    map.insert("core", core::install as InstallFn);
    map.insert("security", security::install);
    map.insert("system_defaults", system_defaults::install);
    map.insert("backup", backup::install);
    map.insert("fonts", fonts::install);
    map.insert("firmware", firmware::install);
    map.insert("power", power::install);
    map.insert("input", input::install);
    map.insert("gpu", gpu::install);
    map.insert("audio", audio::install);
    map.insert("network", network::install);
    map.insert("devtools", devtools::install);
    map.insert("display_server", display_server::install);
    map.insert("login_manager", login_manager::install);
    map.insert("window_manager", window_manager::install);
    map.insert("panels", panels::install);
    map.insert("theming", theming::install);
    map
}
