//! SSD-friendly system defaults: journald caps, VM/inotify sysctls,
//! logrotate, time sync.

use std::path::Path;

use anyhow::Result;

use crate::pacman::install_packages;

use super::Context;
use super::helpers::{sudo_run, surface, write_system_file};

const JOURNALD_DROPIN: &str = "/etc/systemd/journald.conf.d/10-defaults.conf";
const JOURNALD_CONTENT: &str = "\
[Journal]
# Persist logs across boots (falls back to /run early in boot)
Storage=persistent
Compress=yes
Seal=yes

# Bound persistent and runtime usage on SSD
SystemMaxUse=200M
SystemKeepFree=50M
RuntimeMaxUse=50M

# Cap per-file duration and overall retention window
MaxFileSec=1week
MaxRetentionSec=1month
";

const SYSCTL_FILE: &str = "/etc/sysctl.d/99-system-defaults.conf";
const SYSCTL_CONTENT: &str = "\
# With zram swap enabled, prefer swapping to compressed memory over
# dropping caches too eagerly.
vm.swappiness=100
vm.vfs_cache_pressure=50

# Larger file-watch budgets for IDEs, build tools, and sync clients
fs.inotify.max_user_watches=524288
fs.inotify.max_user_instances=1024
fs.inotify.max_queued_events=32768
";

/// Apply journald, sysctl, logrotate, and time-sync defaults.
///
/// # Errors
///
/// Fails when a config write, package install, journald restart, or
/// sysctl reload fails. The time-sync enable is tolerated.
pub fn install(ctx: &Context, _dir: &Path) -> Result<()> {
    write_system_file(ctx, JOURNALD_DROPIN, JOURNALD_CONTENT)?;
    write_system_file(ctx, SYSCTL_FILE, SYSCTL_CONTENT)?;

    // For apps that still write plaintext logs.
    install_packages(ctx, &["logrotate"])?;

    // Already-enabled is fine, and so is a failure here.
    ctx.log
        .action("systemctl enable --now systemd-timesyncd.service");
    let result = ctx.sudo.run_unchecked(
        "systemctl",
        &["enable", "--now", "systemd-timesyncd.service"],
    )?;
    surface(ctx.log.as_ref(), &result);

    sudo_run(ctx, "systemctl", &["restart", "systemd-journald"])?;
    sudo_run(ctx, "sysctl", &["--system"])
}
