//! Security baseline.
//!
//! Deliberately minimal: polkit only. Sudoers is left untouched; wheel
//! access is a decision the machine owner makes once, not something a
//! provisioning run should silently change.

use std::path::Path;

use anyhow::Result;

use crate::pacman::install_packages;

use super::Context;

/// Install the privilege-escalation baseline.
///
/// # Errors
///
/// Fails when the package installation fails.
pub fn install(ctx: &Context, _dir: &Path) -> Result<()> {
    install_packages(ctx, &["polkit"])
}
