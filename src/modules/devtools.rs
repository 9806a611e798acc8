//! Developer tooling: rootless Podman with GPU access, QEMU/KVM/libvirt.

use std::path::Path;

use anyhow::{Result, anyhow};

use crate::pacman::install_packages;

use super::Context;
use super::helpers::{enable_system_units, sudo_run, surface};

const CONTAINER_PACKAGES: &[&str] = &[
    "usbutils",
    "pciutils",
    "podman",
    "podman-compose",
    "nvidia-container-toolkit",
];

const VIRT_PACKAGES: &[&str] = &[
    "qemu-desktop",
    "libvirt",
    "virt-manager",
    "edk2-ovmf",
    "dnsmasq",
];

/// Resolve the invoking user's name.
fn invoking_user(ctx: &Context) -> Result<String> {
    if let Ok(user) = std::env::var("USER")
        && !user.is_empty()
    {
        return Ok(user);
    }
    ctx.home
        .file_name()
        .and_then(|n| n.to_str())
        .map(ToString::to_string)
        .ok_or_else(|| anyhow!("cannot determine the invoking user"))
}

/// Enable the rootless Podman user socket, falling back to the system
/// socket when no user manager is reachable (headless/ssh sessions).
fn enable_podman_socket(ctx: &Context, user: &str) -> Result<()> {
    // Let the user manager run outside active logins.
    sudo_run(ctx, "loginctl", &["enable-linger", user])?;

    let machine = format!("{user}@.host");
    let args = [
        "--user",
        "--machine",
        machine.as_str(),
        "enable",
        "--now",
        "podman.socket",
    ];
    ctx.log.action(&format!("systemctl {}", args.join(" ")));
    let result = ctx.sudo.run_unchecked("systemctl", &args)?;
    if result.success {
        ctx.log.info("rootless Podman user socket enabled");
        ctx.log
            .info("Docker-API clients: DOCKER_HOST=unix://$XDG_RUNTIME_DIR/podman/podman.sock");
        return Ok(());
    }
    surface(ctx.log.as_ref(), &result);

    ctx.log
        .warn("could not enable the user podman.socket; falling back to the system socket");
    enable_system_units(ctx, &["podman.socket"], true)?;
    ctx.log
        .info("Docker-API clients: DOCKER_HOST=unix:///run/podman/podman.sock");
    Ok(())
}

fn add_user_to_groups(ctx: &Context, user: &str, groups: &[&str]) {
    for group in groups {
        ctx.log.action(&format!("usermod -aG {group} {user}"));
        match ctx.sudo.run_unchecked("usermod", &["-aG", group, user]) {
            Ok(result) if result.success => {}
            Ok(result) => {
                surface(ctx.log.as_ref(), &result);
                ctx.log
                    .warn(&format!("could not add {user} to group '{group}'"));
            }
            Err(e) => ctx.log.warn(&format!("usermod failed for '{group}': {e}")),
        }
    }
}

/// Install container and virtualization stacks.
///
/// # Errors
///
/// Fails when packages, the Podman socket setup, or libvirtd fail.
/// Group membership and the default NAT network are best effort.
pub fn install(ctx: &Context, _dir: &Path) -> Result<()> {
    let user = invoking_user(ctx)?;

    install_packages(ctx, CONTAINER_PACKAGES)?;
    enable_podman_socket(ctx, &user)?;

    install_packages(ctx, VIRT_PACKAGES)?;
    enable_system_units(ctx, &["libvirtd.service"], true)?;

    add_user_to_groups(ctx, &user, &["kvm", "libvirt"]);

    // Best effort: the default network may already be running.
    for args in [["net-start", "default"], ["net-autostart", "default"]] {
        ctx.log.action(&format!("virsh {}", args.join(" ")));
        if let Ok(result) = ctx.sudo.run_unchecked("virsh", &args) {
            surface(ctx.log.as_ref(), &result);
        }
    }

    ctx.log
        .info("log out and back in for new group membership to take effect");
    Ok(())
}
