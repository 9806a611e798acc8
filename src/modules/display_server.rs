//! Minimal Xorg base plus NVIDIA DRM KMS for the hybrid setup.
//!
//! No login manager here; that is the login_manager module's job.

use std::path::Path;

use anyhow::Result;

use crate::pacman::install_packages;

use super::Context;
use super::helpers::write_system_file;

const PACKAGES: &[&str] = &[
    "xorg-server",
    "xorg-xinit",
    "xorg-xrandr",
    "xorg-xauth",
    "xorg-xset",
];

const KMS_MODPROBE_PATH: &str = "/etc/modprobe.d/nvidia-drm-modeset.conf";
const KMS_MODPROBE_CONTENT: &str = "\
# Enable DRM KMS for NVIDIA (Wayland & better Xorg modesetting)
options nvidia_drm modeset=1
";

const XORG_OFFLOAD_PATH: &str = "/etc/X11/xorg.conf.d/10-nvidia-offload.conf";
const XORG_OFFLOAD_CONTENT: &str = "\
# Keep Intel iGPU as primary; use NVIDIA for PRIME render offload via `prime-run`.
Section \"OutputClass\"
    Identifier \"nvidia\"
    MatchDriver \"nvidia-drm\"
    Driver \"nvidia\"
    Option \"AllowEmptyInitialConfiguration\"
    Option \"PrimaryGPU\" \"no\"
    ModulePath \"/usr/lib/nvidia/xorg\"
    ModulePath \"/usr/lib/xorg/modules\"
EndSection
";

/// Install the Xorg base and write the NVIDIA KMS/offload configs.
///
/// # Errors
///
/// Fails when packages or either config write fail.
pub fn install(ctx: &Context, _dir: &Path) -> Result<()> {
    install_packages(ctx, PACKAGES)?;
    write_system_file(ctx, KMS_MODPROBE_PATH, KMS_MODPROBE_CONTENT)?;
    write_system_file(ctx, XORG_OFFLOAD_PATH, XORG_OFFLOAD_CONTENT)?;
    ctx.log
        .info("reboot (or reload modules) for NVIDIA DRM KMS to take effect");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::modules::test_helpers::recording_context;

    #[test]
    fn installs_minimal_xorg_stack() {
        let (ctx, exec) = recording_context();
        install(&ctx, Path::new("/tmp/none")).unwrap();
        assert!(exec.saw("pacman", "xorg-server"));
        // modesetting driver comes with xorg-server; never the legacy one
        assert!(!exec.saw("pacman", "xf86-video-intel"));
    }

    #[test]
    fn writes_kms_and_offload_configs() {
        let (ctx, exec) = recording_context();
        install(&ctx, Path::new("/tmp/none")).unwrap();
        assert!(exec.saw("install", KMS_MODPROBE_PATH));
        assert!(exec.saw("install", XORG_OFFLOAD_PATH));
    }
}
