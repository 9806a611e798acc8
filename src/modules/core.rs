//! Core bootstrap: keyring, base tooling, mirrors, full upgrade.
//!
//! Runs first so every later module can assume a current keyring, a
//! sane mirrorlist, and an up-to-date system.

use std::path::Path;

use anyhow::Result;

use crate::pacman::{AUR_HELPER, install_packages};

use super::Context;
use super::helpers::{sudo_run, surface};

const BASE_PACKAGES: &[&str] = &[
    "git",
    "curl",
    "wget",
    "rsync",
    "vim",
    "nano",
    "base-devel",
    "pacman-contrib",
    "reflector",
    "openssh",
];

const MIRROR_COUNTRIES: &str = "United Kingdom,Netherlands,Germany,France";

/// Regenerate the mirrorlist with reflector. Non-fatal: a stale
/// mirrorlist still works, a broken run must not stop the bootstrap.
fn refresh_mirrors(ctx: &Context) -> Result<()> {
    let args = [
        "--country",
        MIRROR_COUNTRIES,
        "--protocol",
        "https",
        "--age",
        "12",
        "--fastest",
        "15",
        "--download-timeout",
        "20",
        "--save",
        "/etc/pacman.d/mirrorlist",
    ];
    ctx.log.action(&format!("reflector {}", args.join(" ")));
    let result = ctx.sudo.run_unchecked("reflector", &args)?;
    surface(ctx.log.as_ref(), &result);
    if !result.success {
        ctx.log
            .warn("reflector failed, keeping the existing mirrorlist");
    }
    Ok(())
}

/// Bootstrap the core system: keyring, base tools, mirrors, upgrade.
///
/// # Errors
///
/// Fails when package installation or the time-sync enable fails.
pub fn install(ctx: &Context, _dir: &Path) -> Result<()> {
    // Keyring first so signature checks on everything else succeed.
    install_packages(ctx, &["archlinux-keyring"])?;
    install_packages(ctx, BASE_PACKAGES)?;

    refresh_mirrors(ctx)?;

    // Full upgrade, streamed so pacman progress stays visible. A partial
    // mirror hiccup here should not stop provisioning.
    ctx.log.action("pacman -Syu --noconfirm");
    let upgrade = ctx
        .sudo
        .run_streamed("pacman", &["-Syu", "--noconfirm"])?;
    if !upgrade.success {
        ctx.log
            .warn("pacman -Syu returned non-zero, continuing anyway");
    }

    sudo_run(
        ctx,
        "systemctl",
        &["enable", "--now", "systemd-timesyncd.service"],
    )?;

    if !ctx.user.which(AUR_HELPER) {
        ctx.log.warn(&format!(
            "{AUR_HELPER} is not installed; AUR packages in later modules will fail"
        ));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::modules::test_helpers::recording_context;

    #[test]
    fn installs_keyring_before_base_tools() {
        let (ctx, exec) = recording_context();
        install(&ctx, Path::new("/tmp/none")).unwrap();
        let pacman_calls: Vec<_> = exec
            .recorded()
            .into_iter()
            .filter(|(p, _)| p == "pacman")
            .collect();
        assert!(pacman_calls.len() >= 3);
        assert!(pacman_calls[0].1.contains(&"archlinux-keyring".to_string()));
    }

    #[test]
    fn runs_full_upgrade_and_timesync() {
        let (ctx, exec) = recording_context();
        install(&ctx, Path::new("/tmp/none")).unwrap();
        assert!(exec.saw("pacman", "-Syu"));
        assert!(exec.saw("systemctl", "systemd-timesyncd.service"));
    }

    #[test]
    fn refreshes_mirrors_via_reflector() {
        let (ctx, exec) = recording_context();
        install(&ctx, Path::new("/tmp/none")).unwrap();
        assert!(exec.saw("reflector", "--save"));
    }
}
