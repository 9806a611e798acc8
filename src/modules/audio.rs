//! PipeWire/WirePlumber audio stack with Bluetooth support.

use std::path::Path;

use anyhow::Result;

use crate::pacman::install_packages;

use super::Context;
use super::helpers::{enable_system_units, enable_user_units, surface, write_system_file};

const PACKAGES: &[&str] = &[
    "pipewire",
    "pipewire-alsa",
    "pipewire-pulse",
    "pipewire-jack",
    "wireplumber",
    "alsa-utils",
    "alsa-ucm-conf",
    "sof-firmware",
    "pavucontrol",
    "bluez",
    "bluez-utils",
];

const PULSE_SWITCH_CONF: &str = "/etc/pipewire/pipewire-pulse.conf.d/50-switch-on-connect.conf";
const PULSE_SWITCH_CONTENT: &str = "\
# Auto-switch to newly connected outputs (USB DAC/HDMI/BT).
# Remove this file to keep the current default sink instead.
pulse.cmd = [
  { cmd = \"load-module\" args = \"module-switch-on-connect\" }
]
";

const WP_SUSPEND_CONF: &str = "/etc/wireplumber/wireplumber.conf.d/60-disable-suspend.conf";
const WP_SUSPEND_CONTENT: &str = "\
# Reduce first-sound lag and pops by disabling node suspend
monitor.alsa.rules = [
  {
    matches = [ { node.name = \"~alsa_input.*\" }, { node.name = \"~alsa_output.*\" } ]
    actions = { update-props = { session.suspend-timeout-seconds = 0 } }
  }
]
monitor.bluez.rules = [
  {
    matches = [ { node.name = \"~bluez_input.*\" }, { node.name = \"~bluez_output.*\" } ]
    actions = { update-props = { session.suspend-timeout-seconds = 0 } }
  }
]
";

const WP_BT_CODECS_CONF: &str = "/etc/wireplumber/wireplumber.conf.d/70-bluez-codecs.conf";
const WP_BT_CODECS_CONTENT: &str = "\
# Prefer modern Bluetooth codec options where available
monitor.bluez.properties = {
  bluez5.enable-sbc-xq = true
  bluez5.enable-msbc   = true
}
";

/// Install PipeWire, configure it, and enable the audio services.
///
/// # Errors
///
/// Fails when packages or config writes fail. Service enables are best
/// effort: user sessions are often absent during provisioning.
pub fn install(ctx: &Context, _dir: &Path) -> Result<()> {
    install_packages(ctx, PACKAGES)?;

    write_system_file(ctx, PULSE_SWITCH_CONF, PULSE_SWITCH_CONTENT)?;
    write_system_file(ctx, WP_SUSPEND_CONF, WP_SUSPEND_CONTENT)?;
    write_system_file(ctx, WP_BT_CODECS_CONF, WP_BT_CODECS_CONTENT)?;

    enable_user_units(
        ctx,
        &[
            "pipewire.service",
            "pipewire-pulse.service",
            "wireplumber.service",
        ],
    );

    if let Err(e) = enable_system_units(ctx, &["bluetooth.service"], true) {
        ctx.log
            .warn(&format!("could not enable bluetooth.service: {e}"));
    }

    // Best-effort visibility; meaningful only inside a user session.
    ctx.log.action("pactl info");
    if let Ok(result) = ctx.user.run_unchecked("pactl", &["info"]) {
        surface(ctx.log.as_ref(), &result);
    }
    Ok(())
}
