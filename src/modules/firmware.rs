//! Firmware, microcode, and the firmware update stack.
//!
//! Surfaces available updates via fwupd but never auto-applies them; a
//! surprise BIOS flash is not something a provisioning run should do.

use std::path::Path;

use anyhow::Result;

use crate::pacman::install_packages;

use super::Context;
use super::helpers::surface;

const PACKAGES: &[&str] = &[
    "linux-firmware",
    "intel-ucode",
    "iucode-tool",
    "fwupd",
    "bolt",
    "nvme-cli",
    // Sound Open Firmware for Intel cAVS audio
    "sof-firmware",
    "alsa-ucm-conf",
];

fn enable_tolerant(ctx: &Context, unit: &str) -> Result<()> {
    ctx.log.action(&format!("systemctl enable --now {unit}"));
    let result = ctx
        .sudo
        .run_unchecked("systemctl", &["enable", "--now", unit])?;
    surface(ctx.log.as_ref(), &result);
    if !result.success {
        ctx.log.warn(&format!("could not enable {unit}, continuing"));
    }
    Ok(())
}

fn surface_unchecked(ctx: &Context, exec_sudo: bool, program: &str, args: &[&str]) -> Result<()> {
    ctx.log.action(&format!("{program} {}", args.join(" ")));
    let exec = if exec_sudo {
        ctx.sudo.as_ref()
    } else {
        ctx.user.as_ref()
    };
    let result = exec.run_unchecked(program, args)?;
    surface(ctx.log.as_ref(), &result);
    Ok(())
}

/// Install firmware packages and regenerate GRUB so microcode loads.
///
/// # Errors
///
/// Fails when package installation or a GRUB regeneration that was
/// attempted fails. Service enables and update listings are tolerated.
pub fn install(ctx: &Context, _dir: &Path) -> Result<()> {
    install_packages(ctx, PACKAGES)?;

    enable_tolerant(ctx, "fwupd.service")?;
    enable_tolerant(ctx, "bolt.service")?;

    // Regenerate GRUB so the freshly installed microcode gets picked up.
    if ctx.sudo.which("grub-mkconfig") {
        ctx.log.action("grub-mkconfig -o /boot/grub/grub.cfg");
        let result = ctx
            .sudo
            .run_unchecked("grub-mkconfig", &["-o", "/boot/grub/grub.cfg"])?;
        surface(ctx.log.as_ref(), &result);
        if !result.success {
            ctx.log
                .warn("grub-mkconfig failed; microcode may not load until GRUB is fixed");
        }
    } else {
        ctx.log.warn(
            "GRUB not detected; for systemd-boot/UKI, ensure intel-ucode is part of the image",
        );
    }

    // Visibility only: list firmware updates, never apply them.
    if ctx.user.which("fwupdmgr") {
        surface_unchecked(ctx, false, "fwupdmgr", &["refresh", "--force"])?;
        surface_unchecked(ctx, false, "fwupdmgr", &["get-updates"])?;
    }
    Ok(())
}
