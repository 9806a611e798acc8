//! Dark theme baseline (Nord-centric) with safe fallbacks.
//!
//! AUR themes are preferred but optional: when Nordic or Bibata are
//! missing, the module falls back to Adwaita variants instead of
//! failing the run.

use std::path::Path;

use anyhow::Result;

use crate::pacman::{install_aur_packages, install_packages};

use super::Context;
use super::helpers::{path_exists, write_system_file};

const GTK_THEME: &str = "Nordic";
const GTK_FALLBACK_THEME: &str = "Adwaita-dark";
const ICON_THEME: &str = "Papirus-Dark";
const CURSOR_THEME: &str = "Bibata-Modern-Ice";
const CURSOR_FALLBACK: &str = "Adwaita";
const KVANTUM_THEME: &str = "Nordic-Darker";

const REPO_PACKAGES: &[&str] = &[
    "papirus-icon-theme",
    "qt5ct",
    "qt6ct",
    "kvantum",
    "gtk-engine-murrine",
];

const AUR_PACKAGES: &[&str] = &[
    "nordic-theme",
    "bibata-cursor-theme",
    "kvantum-theme-nordic",
];

fn apply_gtk_defaults(ctx: &Context, gtk_theme: &str) -> Result<()> {
    let settings = format!(
        "[Settings]\n\
         gtk-theme-name={gtk_theme}\n\
         gtk-icon-theme-name={ICON_THEME}\n\
         gtk-application-prefer-dark-theme=1\n"
    );
    write_system_file(ctx, "/etc/gtk-3.0/settings.ini", &settings)?;
    write_system_file(ctx, "/etc/gtk-4.0/settings.ini", &settings)
}

fn apply_cursor_default(ctx: &Context, cursor: &str) -> Result<()> {
    let index = format!("[Icon Theme]\nInherits={cursor}\n");
    write_system_file(ctx, "/usr/share/icons/default/index.theme", &index)
}

fn apply_qt_defaults(ctx: &Context, kvantum_available: bool) -> Result<()> {
    let style = if kvantum_available { "kvantum" } else { "Fusion" };
    let conf = format!("[Appearance]\nstyle={style}\nicon_theme={ICON_THEME}\n");
    write_system_file(ctx, "/etc/xdg/qt5ct/qt5ct.conf", &conf)?;
    write_system_file(ctx, "/etc/xdg/qt6ct/qt6ct.conf", &conf)
}

fn apply_kvantum_theme(ctx: &Context) -> Result<()> {
    let engine = path_exists(ctx, "/usr/bin/kvantummanager")?
        || path_exists(ctx, "/usr/lib/qt/plugins/styles/libkvantum.so")?;
    let theme = path_exists(ctx, &format!("/usr/share/Kvantum/{KVANTUM_THEME}"))?;
    if !(engine && theme) {
        return Ok(());
    }
    let conf = format!("[General]\ntheme={KVANTUM_THEME}\n");
    write_system_file(ctx, "/etc/xdg/Kvantum/kvantum.kvconfig", &conf)
}

/// Apply system-wide dark theme defaults.
///
/// # Errors
///
/// Fails when repo packages or a config write fail. AUR theme installs
/// are tolerated; fallbacks cover their absence.
pub fn install(ctx: &Context, _dir: &Path) -> Result<()> {
    install_packages(ctx, REPO_PACKAGES)?;

    if let Err(e) = install_aur_packages(ctx, AUR_PACKAGES) {
        ctx.log
            .warn(&format!("AUR theming packages failed ({e}); using fallbacks"));
    }

    let nordic_present = path_exists(ctx, "/usr/share/themes/Nordic")?;
    apply_gtk_defaults(ctx, if nordic_present { GTK_THEME } else { GTK_FALLBACK_THEME })?;

    let bibata_present = path_exists(ctx, &format!("/usr/share/icons/{CURSOR_THEME}"))?;
    if !bibata_present {
        ctx.log.warn(&format!(
            "Bibata cursor not found; falling back to {CURSOR_FALLBACK}"
        ));
    }
    apply_cursor_default(ctx, if bibata_present { CURSOR_THEME } else { CURSOR_FALLBACK })?;

    let kvantum_available = path_exists(ctx, "/usr/share/Kvantum")?
        || path_exists(ctx, "/usr/lib/qt/plugins/styles/libkvantum.so")?;
    apply_qt_defaults(ctx, kvantum_available)?;
    apply_kvantum_theme(ctx)
}
