//! Domain-specific error types for the provisioning engine.
//!
//! This module provides a structured error hierarchy using [`thiserror`].
//! Internal modules return typed errors (e.g., [`CommandError`],
//! [`DuplicateOrderError`]) while command handlers at the CLI boundary
//! convert them to [`anyhow::Error`] via the standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! ArchupError
//! ├── Discovery(DiscoveryError)       — manifest parsing, registry lookup
//! ├── DuplicateOrders(DuplicateOrderError) — colliding module order numbers
//! ├── Module(ModuleError)             — a module's install failed
//! ├── Command(CommandError)           — external command spawn/exit problems
//! └── Sudo(SudoError)                 — privilege session seeding
//! ```

use thiserror::Error;

/// Top-level error type for the provisioning engine.
///
/// Aggregates domain-specific sub-errors and is convertible to
/// [`anyhow::Error`] for use at CLI command boundaries.
#[derive(Error, Debug)]
pub enum ArchupError {
    /// Module discovery error (manifest parsing, unknown install key).
    #[error("Discovery error: {0}")]
    Discovery(#[from] DiscoveryError),

    /// Two or more modules share an order number.
    #[error("{0}")]
    DuplicateOrders(#[from] DuplicateOrderError),

    /// A module's install entry point failed.
    #[error("Module error: {0}")]
    Module(#[from] ModuleError),

    /// An external command failed to spawn or exited non-zero.
    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    /// The sudo session could not be seeded.
    #[error("Sudo error: {0}")]
    Sudo(#[from] SudoError),
}

/// Errors that exclude a single module from discovery without aborting it.
#[derive(Error, Debug)]
pub enum DiscoveryError {
    /// The module's `module.toml` could not be read.
    #[error("cannot read manifest for module '{module}': {source}")]
    ManifestIo {
        /// Folder name of the module.
        module: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The module's `module.toml` is not valid TOML.
    #[error("invalid manifest for module '{module}': {message}")]
    ManifestSyntax {
        /// Folder name of the module.
        module: String,
        /// Parser diagnostic.
        message: String,
    },

    /// The manifest names an install entry point that is not registered.
    #[error("module '{module}' has no registered install entry point '{key}'")]
    UnknownInstall {
        /// Folder name of the module.
        module: String,
        /// The unresolved registry key.
        key: String,
    },
}

/// Two or more discovered modules share an order number.
///
/// Fatal before any execution: no module runs when this is returned.
#[derive(Debug)]
pub struct DuplicateOrderError {
    /// Each colliding order number with the module names at that order.
    pub collisions: Vec<(u32, Vec<String>)>,
}

impl std::fmt::Display for DuplicateOrderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "duplicate module order numbers:")?;
        for (order, names) in &self.collisions {
            write!(f, " [{order}: {}]", names.join(", "))?;
        }
        Ok(())
    }
}

impl std::error::Error for DuplicateOrderError {}

/// A module's install entry point reported failure.
#[derive(Error, Debug)]
#[error("module '{module}' failed: {reason}")]
pub struct ModuleError {
    /// Folder name of the failed module.
    pub module: String,
    /// Human-readable reason for the failure.
    pub reason: String,
}

/// Errors from running external commands.
#[derive(Error, Debug)]
pub enum CommandError {
    /// The command could not be spawned at all.
    #[error("failed to execute {program}: {source}")]
    Spawn {
        /// Program that could not be started.
        program: String,
        /// Underlying OS error.
        source: std::io::Error,
    },

    /// A checked command exited non-zero.
    ///
    /// Carries the exit code and both captured streams so callers can
    /// surface diagnostics without re-running anything.
    #[error("{program} failed (exit {code}): {}", .stderr.trim())]
    Failed {
        /// Program that failed.
        program: String,
        /// Exit code, or `-1` when terminated by a signal.
        code: i32,
        /// Captured stdout (empty when the command streamed).
        stdout: String,
        /// Captured stderr (empty when the command streamed).
        stderr: String,
    },
}

/// Errors from the privileged session lifecycle.
#[derive(Error, Debug)]
pub enum SudoError {
    /// Interactive seeding of the sudo timestamp failed.
    ///
    /// Non-fatal to startup: the session is still returned, but every
    /// subsequent privileged call will fail fast (`sudo -n` never prompts).
    #[error("failed to seed sudo credentials: {0}")]
    SeedFailed(String),
}
