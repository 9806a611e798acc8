//! Laptop power and thermal baseline: TLP + thermald.
//!
//! Driver-agnostic on purpose; GPU runtime PM lives in the gpu module.

use std::path::Path;

use anyhow::Result;

use crate::pacman::install_packages;

use super::Context;
use super::helpers::{enable_system_units, write_system_file};

const TLP_DROPIN: &str = "/etc/tlp.d/10-laptop-baseline.conf";
const TLP_DROPIN_CONTENT: &str = "\
# Safe, driver-agnostic defaults.

# CPU energy/perf (Intel HWP capable CPUs use EPP underneath)
CPU_DRIVER_OPMODE_ON_AC=active
CPU_DRIVER_OPMODE_ON_BAT=active
CPU_ENERGY_PERF_POLICY_ON_AC=balance_performance
CPU_ENERGY_PERF_POLICY_ON_BAT=balance_power
CPU_HWP_DYN_BOOST_ON_AC=1
CPU_HWP_DYN_BOOST_ON_BAT=0
CPU_BOOST_ON_AC=1
CPU_BOOST_ON_BAT=0

# Runtime PM: allow autosuspend on both AC and battery
RUNTIME_PM_ON_AC=auto
RUNTIME_PM_ON_BAT=auto
";

fn mask_tolerant(ctx: &Context, unit: &str) {
    ctx.log.action(&format!("systemctl mask --now {unit}"));
    // Harmless if the unit does not exist on this machine.
    if let Err(e) = ctx.sudo.run_unchecked("systemctl", &["mask", "--now", unit]) {
        ctx.log.warn(&format!("could not mask {unit}: {e}"));
    }
}

/// Install and enable TLP and thermald, masking conflicting services.
///
/// # Errors
///
/// Fails when packages, the TLP drop-in, or the service enables fail.
pub fn install(ctx: &Context, _dir: &Path) -> Result<()> {
    install_packages(ctx, &["tlp", "tlp-rdw", "thermald", "powertop"])?;

    // TLP conflicts with power-profiles-daemon; RDW wants rfkill masked.
    mask_tolerant(ctx, "power-profiles-daemon.service");
    mask_tolerant(ctx, "systemd-rfkill.service");
    mask_tolerant(ctx, "systemd-rfkill.socket");

    write_system_file(ctx, TLP_DROPIN, TLP_DROPIN_CONTENT)?;

    enable_system_units(ctx, &["tlp.service", "thermald.service"], true)?;

    // Optional dispatcher for TLP RDW; absence is fine.
    ctx.log
        .action("systemctl enable --now NetworkManager-dispatcher.service");
    if let Err(e) = ctx.sudo.run_unchecked(
        "systemctl",
        &["enable", "--now", "NetworkManager-dispatcher.service"],
    ) {
        ctx.log
            .warn(&format!("could not enable NetworkManager-dispatcher: {e}"));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::modules::test_helpers::recording_context;

    #[test]
    fn installs_power_stack() {
        let (ctx, exec) = recording_context();
        install(&ctx, Path::new("/tmp/none")).unwrap();
        assert!(exec.saw("pacman", "tlp"));
        assert!(exec.saw("pacman", "thermald"));
    }

    #[test]
    fn masks_conflicting_services() {
        let (ctx, exec) = recording_context();
        install(&ctx, Path::new("/tmp/none")).unwrap();
        assert!(exec.saw("systemctl", "power-profiles-daemon.service"));
        assert!(exec.saw("systemctl", "systemd-rfkill.socket"));
    }

    #[test]
    fn writes_dropin_and_enables_services() {
        let (ctx, exec) = recording_context();
        install(&ctx, Path::new("/tmp/none")).unwrap();
        assert!(exec.saw("install", TLP_DROPIN));
        assert!(exec.saw("systemctl", "tlp.service"));
        assert!(exec.saw("systemctl", "thermald.service"));
    }
}
