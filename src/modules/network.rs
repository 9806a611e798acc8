//! Networking stack: NetworkManager with iwd, Bluetooth, VPN support.
//!
//! iwd.service is never enabled directly; NetworkManager manages iwd as
//! its Wi-Fi backend. bolt is D-Bus activated and needs no enable.

use std::path::Path;

use anyhow::Result;

use crate::pacman::install_packages;

use super::Context;
use super::helpers::{enable_system_units, surface, write_system_file};

const PACKAGES: &[&str] = &[
    "networkmanager",
    "iwd",
    "bluez",
    "bluez-utils",
    "bolt",
    "usbutils",
    "ethtool",
    "nm-connection-editor",
    "network-manager-applet",
    "openvpn",
    "networkmanager-openvpn",
    "wireguard-tools",
];

const WIFI_BACKEND_CONF: &str = "/etc/NetworkManager/conf.d/wifi_backend.conf";
const WIFI_BACKEND_CONTENT: &str = "\
[device]
wifi.backend=iwd
";

const MAC_PRIVACY_CONF: &str = "/etc/NetworkManager/conf.d/wifi_rand_mac.conf";
const MAC_PRIVACY_CONTENT: &str = "\
[device-mac-randomization]
wifi.scan-rand-mac-address=yes

[connection-mac-randomization]
ethernet.cloned-mac-address=random
wifi.cloned-mac-address=stable
";

fn diagnostic(ctx: &Context, program: &str, args: &[&str]) {
    ctx.log.action(&format!("{program} {}", args.join(" ")));
    match ctx.sudo.run_unchecked(program, args) {
        Ok(result) => surface(ctx.log.as_ref(), &result),
        Err(e) => ctx.log.warn(&format!("skipping diagnostic {program}: {e}")),
    }
}

/// Install and configure the network stack.
///
/// # Errors
///
/// Fails when packages, config writes, or the service enables fail.
pub fn install(ctx: &Context, _dir: &Path) -> Result<()> {
    install_packages(ctx, PACKAGES)?;

    write_system_file(ctx, WIFI_BACKEND_CONF, WIFI_BACKEND_CONTENT)?;
    write_system_file(ctx, MAC_PRIVACY_CONF, MAC_PRIVACY_CONTENT)?;

    enable_system_units(ctx, &["NetworkManager.service", "bluetooth.service"], true)?;

    diagnostic(ctx, "nmcli", &["general", "status"]);
    diagnostic(ctx, "nmcli", &["device"]);
    diagnostic(ctx, "rfkill", &["list"]);
    Ok(())
}
