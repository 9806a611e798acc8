//! SDDM login manager, with optional custom theme payload.
//!
//! The service is enabled without `--now`: starting a display manager
//! in the middle of a provisioning run would tear down the session that
//! is driving it.

use std::path::Path;

use anyhow::Result;

use crate::pacman::install_packages;

use super::Context;
use super::helpers::{path_exists, sudo_run, write_system_file};

const THEME_NAME: &str = "arch-bootstrap";
const THEME_DST: &str = "/usr/share/sddm/themes";
const THEME_CONF: &str = "/etc/sddm.conf.d/10-theme.conf";

const THEME_CONF_CONTENT: &str = "\
[Theme]
Current=arch-bootstrap
";

/// Deploy the module's `theme/` payload to the SDDM themes directory.
/// Returns whether a theme was actually deployed.
fn deploy_theme(ctx: &Context, dir: &Path) -> Result<bool> {
    let src = dir.join("theme");
    if !src.is_dir() {
        ctx.log
            .info("no custom theme payload; SDDM will use its default theme");
        return Ok(false);
    }
    let dst = format!("{THEME_DST}/{THEME_NAME}");
    if path_exists(ctx, &dst)? {
        sudo_run(ctx, "cp", &["-a", &dst, &format!("{dst}.bak")])?;
    }
    sudo_run(ctx, "mkdir", &["-p", THEME_DST])?;
    let src_str = src.to_string_lossy();
    sudo_run(ctx, "cp", &["-a", src_str.as_ref(), &dst])?;
    Ok(true)
}

/// Install SDDM, enable it for next boot, and deploy the theme payload.
///
/// # Errors
///
/// Fails when the package, the enable, or the theme deployment fails.
pub fn install(ctx: &Context, dir: &Path) -> Result<()> {
    install_packages(ctx, &["sddm"])?;

    if std::env::var_os("DISPLAY").is_some() {
        // Enabling a second display manager from inside a graphical
        // session risks a lockout on next boot.
        ctx.log
            .info("graphical session detected; not enabling sddm.service");
    } else {
        sudo_run(ctx, "systemctl", &["enable", "sddm.service"])?;
    }

    if deploy_theme(ctx, dir)? {
        write_system_file(ctx, THEME_CONF, THEME_CONF_CONTENT)?;
    }
    Ok(())
}
