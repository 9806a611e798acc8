//! Input device stack: libinput for Xorg plus payload configs.
//!
//! Payload files shipped inside the module folder are deployed
//! system-wide: `xorg.conf.d/*` to `/etc/X11/xorg.conf.d/` and
//! `udev/*` to `/etc/udev/rules.d/`. Both payloads are optional.

use std::path::Path;

use anyhow::{Context as _, Result};

use crate::pacman::install_packages;

use super::Context;
use super::helpers::{sudo_run, write_system_file};

const PACKAGES: &[&str] = &[
    "libinput",
    "xf86-input-libinput",
    "xorg-xinput",
    "xorg-xev",
    "evtest",
];

/// Deploy every regular file under `src` into the system directory
/// `dest_dir`, keeping file names. Missing `src` is a quiet skip.
fn deploy_payload(ctx: &Context, src: &Path, dest_dir: &str) -> Result<bool> {
    if !src.is_dir() {
        return Ok(false);
    }
    let mut deployed = false;
    let mut entries: Vec<_> = std::fs::read_dir(src)
        .with_context(|| format!("cannot read payload directory {}", src.display()))?
        .filter_map(std::result::Result::ok)
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .collect();
    entries.sort();
    for path in entries {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("cannot read payload file {}", path.display()))?;
        write_system_file(ctx, &format!("{dest_dir}/{name}"), &content)?;
        deployed = true;
    }
    Ok(deployed)
}

/// Install the libinput stack and deploy Xorg/udev payload configs.
///
/// # Errors
///
/// Fails when packages or any payload deployment fail.
pub fn install(ctx: &Context, dir: &Path) -> Result<()> {
    install_packages(ctx, PACKAGES)?;

    if !deploy_payload(ctx, &dir.join("xorg.conf.d"), "/etc/X11/xorg.conf.d")? {
        ctx.log
            .info("no xorg.conf.d payload; Xorg will use libinput defaults");
    }

    if deploy_payload(ctx, &dir.join("udev"), "/etc/udev/rules.d")? {
        sudo_run(ctx, "udevadm", &["control", "--reload"])?;
        sudo_run(ctx, "udevadm", &["trigger"])?;
    }
    Ok(())
}
