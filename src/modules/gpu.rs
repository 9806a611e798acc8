//! Hybrid Intel + NVIDIA (PRIME offload) with runtime power management.
//!
//! No xf86-video-intel: the modesetting driver built into xorg-server
//! is the right choice for recent iGPUs. X11 verification belongs to
//! the display-server module.

use std::path::Path;

use anyhow::Result;

use crate::pacman::install_packages;

use super::Context;
use super::helpers::{sudo_run, write_system_file};

const UDEV_RULES_PATH: &str = "/etc/udev/rules.d/80-nvidia-pm.rules";
const MODPROBE_CONF_PATH: &str = "/etc/modprobe.d/nvidia-pm.conf";

const UDEV_RULES_CONTENT: &str = "\
# Enable runtime PM for NVIDIA VGA/3D controller devices on driver bind/add
ACTION==\"bind\",   SUBSYSTEM==\"pci\", ATTR{vendor}==\"0x10de\", ATTR{class}==\"0x030000\", TEST==\"power/control\", ATTR{power/control}=\"auto\"
ACTION==\"bind\",   SUBSYSTEM==\"pci\", ATTR{vendor}==\"0x10de\", ATTR{class}==\"0x030200\", TEST==\"power/control\", ATTR{power/control}=\"auto\"
ACTION==\"add\",    SUBSYSTEM==\"pci\", ATTR{vendor}==\"0x10de\", ATTR{class}==\"0x030000\", TEST==\"power/control\", ATTR{power/control}=\"auto\"
ACTION==\"add\",    SUBSYSTEM==\"pci\", ATTR{vendor}==\"0x10de\", ATTR{class}==\"0x030200\", TEST==\"power/control\", ATTR{power/control}=\"auto\"
# Disable runtime PM on unbind (handovers / driver unload)
ACTION==\"unbind\", SUBSYSTEM==\"pci\", ATTR{vendor}==\"0x10de\", ATTR{class}==\"0x030000\", TEST==\"power/control\", ATTR{power/control}=\"on\"
ACTION==\"unbind\", SUBSYSTEM==\"pci\", ATTR{vendor}==\"0x10de\", ATTR{class}==\"0x030200\", TEST==\"power/control\", ATTR{power/control}=\"on\"
";

const MODPROBE_CONTENT: &str = "\
# Deeper NVIDIA runtime power management for Turing Optimus notebooks
options nvidia \"NVreg_DynamicPowerManagement=0x02\"
";

const PACKAGES: &[&str] = &[
    // Intel userspace, VAAPI, Vulkan
    "mesa",
    "mesa-utils",
    "vulkan-intel",
    "intel-media-driver",
    "libva-utils",
    // NVIDIA proprietary + PRIME offload helpers
    "nvidia",
    "nvidia-utils",
    "nvidia-settings",
    "nvidia-prime",
    "vulkan-tools",
];

/// Install hybrid GPU drivers and configure NVIDIA runtime PM.
///
/// # Errors
///
/// Fails when packages, config writes, or the udev reload fail.
pub fn install(ctx: &Context, _dir: &Path) -> Result<()> {
    install_packages(ctx, PACKAGES)?;

    write_system_file(ctx, UDEV_RULES_PATH, UDEV_RULES_CONTENT)?;
    write_system_file(ctx, MODPROBE_CONF_PATH, MODPROBE_CONTENT)?;

    sudo_run(ctx, "udevadm", &["control", "--reload"])?;
    sudo_run(ctx, "udevadm", &["trigger"])?;

    ctx.log.info(
        "after the display server is up, verify with: prime-run glxinfo | grep 'OpenGL renderer'",
    );
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::modules::test_helpers::recording_context;

    #[test]
    fn installs_intel_and_nvidia_userspace() {
        let (ctx, exec) = recording_context();
        install(&ctx, Path::new("/tmp/none")).unwrap();
        assert!(exec.saw("pacman", "vulkan-intel"));
        assert!(exec.saw("pacman", "nvidia-prime"));
    }

    #[test]
    fn writes_runtime_pm_configs() {
        let (ctx, exec) = recording_context();
        install(&ctx, Path::new("/tmp/none")).unwrap();
        assert!(exec.saw("install", UDEV_RULES_PATH));
        assert!(exec.saw("install", MODPROBE_CONF_PATH));
    }

    #[test]
    fn reloads_udev_after_writing_rules() {
        let (ctx, exec) = recording_context();
        install(&ctx, Path::new("/tmp/none")).unwrap();
        assert!(exec.saw("udevadm", "--reload"));
        assert!(exec.saw("udevadm", "trigger"));
    }
}
