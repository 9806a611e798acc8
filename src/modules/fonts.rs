//! System-wide Nerd Font defaults.
//!
//! Sets JetBrainsMono Nerd Font as the generic `monospace` family only;
//! forcing it on sans-serif/serif makes UI text monospace, which nobody
//! wants twice.

use std::path::Path;

use anyhow::Result;

use crate::pacman::install_packages;

use super::Context;
use super::helpers::{path_exists, sudo_run, surface, write_system_file};

const LOCAL_CONF: &str = "/etc/fonts/local.conf";
const NERD_SYMBOLS_AVAIL: &str = "/usr/share/fontconfig/conf.avail/10-nerd-font-symbols.conf";
const NERD_SYMBOLS_LINK: &str = "/etc/fonts/conf.d/10-nerd-font-symbols.conf";

const LOCAL_CONF_CONTENT: &str = "\
<?xml version='1.0'?>
<!DOCTYPE fontconfig SYSTEM 'fonts.dtd'>
<fontconfig>
  <!-- Default monospace font -> JetBrainsMono Nerd Font -->
  <match target=\"pattern\">
    <test qual=\"any\" name=\"family\"><string>monospace</string></test>
    <edit name=\"family\" mode=\"assign\" binding=\"strong\">
      <string>JetBrainsMono Nerd Font</string>
    </edit>
  </match>
</fontconfig>
";

/// Install Nerd Fonts and make them the monospace default.
///
/// # Errors
///
/// Fails when packages or the fontconfig write fail. Cache refresh and
/// verification are best effort.
pub fn install(ctx: &Context, _dir: &Path) -> Result<()> {
    install_packages(
        ctx,
        &[
            // fontconfig provides fc-cache on minimal installs
            "fontconfig",
            "ttf-jetbrains-mono-nerd",
            "ttf-nerd-fonts-symbols",
        ],
    )?;

    write_system_file(ctx, LOCAL_CONF, LOCAL_CONF_CONTENT)?;

    // Symbols fallback so apps get Nerd icons when base fonts lack glyphs.
    if path_exists(ctx, NERD_SYMBOLS_AVAIL)? {
        sudo_run(ctx, "ln", &["-sf", NERD_SYMBOLS_AVAIL, NERD_SYMBOLS_LINK])?;
    } else {
        ctx.log.warn(&format!(
            "{NERD_SYMBOLS_AVAIL} not found; skipping symbols fallback rule"
        ));
    }

    ctx.log.action("fc-cache -f");
    let cache = ctx.sudo.run_unchecked("fc-cache", &["-f"])?;
    if !cache.success {
        surface(ctx.log.as_ref(), &cache);
        ctx.log.warn("could not refresh the font cache");
    }

    ctx.log.action("fc-match monospace");
    let verify = ctx.user.run_unchecked("fc-match", &["monospace"])?;
    surface(ctx.log.as_ref(), &verify);
    Ok(())
}
