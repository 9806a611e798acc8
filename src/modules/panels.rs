//! Polybar and sensors tooling.
//!
//! Polybar ships a working system config at /etc/polybar/config.ini;
//! personal bars live in dotfiles and override it.

use std::path::Path;

use anyhow::Result;

use crate::pacman::install_packages;

use super::Context;

/// Install Polybar and lm_sensors.
///
/// # Errors
///
/// Fails when package installation fails.
pub fn install(ctx: &Context, _dir: &Path) -> Result<()> {
    install_packages(ctx, &["polybar", "lm_sensors"])?;
    ctx.log
        .info("run 'sudo sensors-detect' once to improve temperature readings");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::modules::test_helpers::recording_context;

    #[test]
    fn installs_polybar_and_sensors() {
        let (ctx, exec) = recording_context();
        install(&ctx, Path::new("/tmp/none")).unwrap();
        assert!(exec.saw("pacman", "polybar"));
        assert!(exec.saw("pacman", "lm_sensors"));
    }
}
