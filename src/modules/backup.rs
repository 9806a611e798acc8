//! Btrfs snapshot stack: snapper, snap-pac, grub-btrfs.
//!
//! Assumes a Btrfs root and an installed GRUB; refuses to run against
//! anything else rather than half-configure a foreign layout.

use std::path::Path;

use anyhow::{Result, bail};

use crate::pacman::install_packages;

use super::Context;
use super::helpers::{path_exists, sudo_run, surface, write_system_file};

const SNAPPER_ROOT_CONFIG: &str = "/etc/snapper/configs/root";
const PKGLIST_HOOK: &str = "/etc/pacman.d/hooks/95-backup-pkglist.hook";

const PKGLIST_HOOK_CONTENT: &str = "\
[Trigger]
Operation = Install
Operation = Upgrade
Operation = Remove
Type = Package
Target = *

[Action]
Description = Save package lists to /var/backups (explicit and foreign)
When = PostTransaction
Exec = /bin/bash -lc 'install -d -m 0755 /var/backups && pacman -Qqe > /var/backups/pkglist-explicit.txt && pacman -Qqm > /var/backups/pkglist-aur.txt || true'
";

// Conservative retention; editable later in the snapper config.
const SNAPPER_LIMITS: &[(&str, &str)] = &[
    ("TIMELINE_CREATE", "yes"),
    ("TIMELINE_CLEANUP", "yes"),
    ("TIMELINE_LIMIT_HOURLY", "8"),
    ("TIMELINE_LIMIT_DAILY", "7"),
    ("TIMELINE_LIMIT_WEEKLY", "4"),
    ("TIMELINE_LIMIT_MONTHLY", "12"),
    ("TIMELINE_LIMIT_YEARLY", "0"),
];

fn root_fstype(ctx: &Context) -> Result<String> {
    let result = ctx
        .sudo
        .run_unchecked("findmnt", &["-n", "-o", "FSTYPE", "/"])?;
    Ok(result.stdout.trim().to_string())
}

fn ensure_snapper_config(ctx: &Context) -> Result<()> {
    if path_exists(ctx, SNAPPER_ROOT_CONFIG)? {
        ctx.log.info("snapper root config already present");
        return Ok(());
    }
    ctx.log.action("snapper -c root create-config /");
    let result = ctx
        .sudo
        .run_unchecked("snapper", &["-c", "root", "create-config", "/"])?;
    surface(ctx.log.as_ref(), &result);
    if !result.success {
        // create-config trips over installer-made /.snapshots layouts but
        // may still have written the config. Re-check before giving up.
        ctx.log
            .warn("snapper create-config failed, checking whether the config exists anyway");
        if !path_exists(ctx, SNAPPER_ROOT_CONFIG)? {
            bail!("snapper root config could not be created");
        }
    }
    Ok(())
}

fn tune_snapper_limits(ctx: &Context) -> Result<()> {
    for (key, value) in SNAPPER_LIMITS {
        let expr = format!("s/^{key}=.*/{key}=\"{value}\"/");
        sudo_run(ctx, "sed", &["-i", &expr, SNAPPER_ROOT_CONFIG])?;
    }
    Ok(())
}

/// Set up snapper snapshots with pacman and GRUB integration.
///
/// # Errors
///
/// Fails when the root filesystem is not Btrfs, or when any package,
/// snapper, timer, or hook step fails.
pub fn install(ctx: &Context, _dir: &Path) -> Result<()> {
    let fstype = root_fstype(ctx)?;
    if !fstype.eq_ignore_ascii_case("btrfs") {
        bail!("expected a Btrfs root filesystem, detected '{fstype}'");
    }

    install_packages(
        ctx,
        &[
            "btrfs-progs",
            "snapper",
            "snap-pac",
            "grub-btrfs",
            "inotify-tools",
        ],
    )?;

    ensure_snapper_config(ctx)?;
    tune_snapper_limits(ctx)?;

    sudo_run(ctx, "systemctl", &["enable", "--now", "snapper-timeline.timer"])?;
    sudo_run(ctx, "systemctl", &["enable", "--now", "snapper-cleanup.timer"])?;

    if !path_exists(ctx, PKGLIST_HOOK)? {
        write_system_file(ctx, PKGLIST_HOOK, PKGLIST_HOOK_CONTENT)?;
    }

    // GRUB submenu updates when snapshots change.
    sudo_run(ctx, "systemctl", &["enable", "--now", "grub-btrfsd.service"])
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::Path;
    use std::sync::{Arc, Mutex, PoisonError};

    use super::*;
    use crate::error::CommandError;
    use crate::exec::{ExecResult, Executor, Invocation};
    use crate::modules::test_helpers::{make_context, recording_context};

    /// Recorder whose `findmnt` reports a configurable filesystem.
    #[derive(Debug)]
    struct FsExecutor {
        fstype: &'static str,
        calls: Mutex<Vec<(String, Vec<String>)>>,
    }

    impl FsExecutor {
        fn new(fstype: &'static str) -> Self {
            Self {
                fstype,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn saw(&self, program: &str, needle: &str) -> bool {
            self.calls
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .iter()
                .any(|(p, args)| p == program && args.iter().any(|a| a == needle))
        }
    }

    impl Executor for FsExecutor {
        fn invoke(
            &self,
            program: &str,
            args: &[&str],
            _: &Invocation<'_>,
        ) -> Result<ExecResult, CommandError> {
            self.calls
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push((
                    program.to_string(),
                    args.iter().map(|s| (*s).to_string()).collect(),
                ));
            let stdout = if program == "findmnt" {
                format!("{}\n", self.fstype)
            } else {
                String::new()
            };
            Ok(ExecResult {
                stdout,
                stderr: String::new(),
                success: true,
                code: Some(0),
            })
        }

        fn which(&self, _: &str) -> bool {
            true
        }
    }

    #[test]
    fn refuses_non_btrfs_root() {
        let (ctx, exec) = recording_context();
        // Recorder returns empty stdout, so the fstype probe sees "".
        let err = install(&ctx, Path::new("/tmp/none")).unwrap_err();
        assert!(err.to_string().contains("Btrfs"));
        assert!(!exec.saw("pacman", "snapper"));
    }

    #[test]
    fn btrfs_root_installs_snapshot_stack() {
        let exec = Arc::new(FsExecutor::new("btrfs"));
        let ctx = make_context(
            Arc::clone(&exec) as Arc<dyn Executor>,
            Arc::clone(&exec) as Arc<dyn Executor>,
        );
        install(&ctx, Path::new("/tmp/none")).unwrap();
        assert!(exec.saw("pacman", "snap-pac"));
        assert!(exec.saw("systemctl", "snapper-timeline.timer"));
        assert!(exec.saw("systemctl", "grub-btrfsd.service"));
        assert!(exec.saw("sed", SNAPPER_ROOT_CONFIG));
    }
}
