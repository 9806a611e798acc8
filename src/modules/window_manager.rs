//! i3 window manager stack for X11.
//!
//! Packages only: per-user i3/rofi/picom/dunst configuration belongs to
//! dotfiles, not system provisioning.

use std::path::Path;

use anyhow::Result;

use crate::pacman::install_packages;

use super::Context;

const PACKAGES: &[&str] = &[
    // Core WM
    "i3-wm",
    "i3status",
    // Launcher
    "rofi",
    // Lock / idle
    "i3lock",
    "xss-lock",
    "xorg-xset",
    // Compositor, notifications, utilities
    "picom",
    "dunst",
    "feh",
    "arandr",
    "xclip",
    // QoL
    "playerctl",
    "brightnessctl",
    "flameshot",
    "lxappearance",
    // GUI auth prompts
    "polkit-gnome",
];

/// Install the i3 stack.
///
/// # Errors
///
/// Fails when package installation fails.
pub fn install(ctx: &Context, _dir: &Path) -> Result<()> {
    install_packages(ctx, PACKAGES)?;
    ctx.log
        .info("i3 session installed; the login manager will list 'i3' at login");
    Ok(())
}
