//! Package installation through pacman and the AUR helper.
//!
//! Repo packages go through `pacman -S --needed --noconfirm` under the
//! privileged executor. AUR packages go through `paru` under the plain
//! user executor; running an AUR helper as root is both unsupported and
//! unsafe, paru re-escalates itself for the install step.

use anyhow::{Result, bail};

use crate::error::CommandError;
use crate::modules::Context;
use crate::modules::helpers::surface;

/// The AUR helper this engine drives.
pub const AUR_HELPER: &str = "paru";

/// Normalise a raw package list.
///
/// Trims whitespace from each name, drops entries that are empty after
/// trimming, and removes duplicates while preserving first-seen order.
#[must_use]
pub fn sanitize_names(names: &[&str]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    names
        .iter()
        .map(|n| n.trim())
        .filter(|n| !n.is_empty())
        .filter(|n| seen.insert((*n).to_string()))
        .map(ToString::to_string)
        .collect()
}

fn report(ctx: &Context, program: &str, result: &crate::exec::ExecResult) -> Result<()> {
    surface(ctx.log.as_ref(), result);
    if result.success {
        Ok(())
    } else {
        Err(CommandError::Failed {
            program: program.to_string(),
            code: result.code.unwrap_or(-1),
            stdout: result.stdout.clone(),
            stderr: result.stderr.clone(),
        }
        .into())
    }
}

/// Install repo packages with pacman.
///
/// `--needed` makes the call idempotent: already-installed packages are
/// skipped rather than reinstalled. An empty list (after sanitising) is
/// a successful no-op.
///
/// # Errors
///
/// Fails when pacman cannot spawn or exits non-zero; captured output is
/// surfaced on the logger either way.
pub fn install_packages(ctx: &Context, names: &[&str]) -> Result<()> {
    let packages = sanitize_names(names);
    if packages.is_empty() {
        ctx.log.debug("no packages to install");
        return Ok(());
    }
    let mut args = vec!["-S", "--needed", "--noconfirm"];
    args.extend(packages.iter().map(String::as_str));
    ctx.log.action(&format!("pacman {}", args.join(" ")));
    let result = ctx.sudo.run_unchecked("pacman", &args)?;
    report(ctx, "pacman", &result)
}

/// Install AUR packages with the AUR helper, as the invoking user.
///
/// # Errors
///
/// Fails when the helper is not on PATH, cannot spawn, or exits
/// non-zero.
pub fn install_aur_packages(ctx: &Context, names: &[&str]) -> Result<()> {
    let packages = sanitize_names(names);
    if packages.is_empty() {
        ctx.log.debug("no AUR packages to install");
        return Ok(());
    }
    if !ctx.user.which(AUR_HELPER) {
        bail!("AUR helper '{AUR_HELPER}' is not installed; cannot install: {}",
            packages.join(", "));
    }
    let mut args = vec!["-S", "--needed", "--noconfirm"];
    args.extend(packages.iter().map(String::as_str));
    ctx.log.action(&format!("{AUR_HELPER} {}", args.join(" ")));
    let result = ctx.user.run_unchecked(AUR_HELPER, &args)?;
    report(ctx, AUR_HELPER, &result)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::sync::{Arc, Mutex, PoisonError};

    use super::*;
    use crate::error::CommandError;
    use crate::exec::{ExecResult, Executor, Invocation};
    use crate::modules::test_helpers::{
        RecordingExecutor, make_context, recording_context,
    };

    #[test]
    fn sanitize_trims_and_drops_blanks() {
        let out = sanitize_names(&[" tlp ", "", "  ", "thermald"]);
        assert_eq!(out, ["tlp", "thermald"]);
    }

    #[test]
    fn sanitize_dedupes_preserving_order() {
        let out = sanitize_names(&["git", "base-devel", "git", "rustup", "base-devel"]);
        assert_eq!(out, ["git", "base-devel", "rustup"]);
    }

    #[test]
    fn install_empty_list_is_noop() {
        let (ctx, exec) = recording_context();
        install_packages(&ctx, &[]).unwrap();
        install_packages(&ctx, &["", "  "]).unwrap();
        assert!(exec.recorded().is_empty());
    }

    #[test]
    fn install_builds_expected_command_line() {
        let (ctx, exec) = recording_context();
        install_packages(&ctx, &["tlp", "thermald"]).unwrap();
        let calls = exec.recorded();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "pacman");
        assert_eq!(
            calls[0].1,
            ["-S", "--needed", "--noconfirm", "tlp", "thermald"]
        );
    }

    #[test]
    fn install_twice_with_same_list_is_idempotent() {
        // --needed makes the second pass a no-op on the system; both
        // invocations succeed and issue the identical command line.
        let (ctx, exec) = recording_context();
        install_packages(&ctx, &["tlp", "thermald"]).unwrap();
        install_packages(&ctx, &["tlp", "thermald"]).unwrap();
        let calls = exec.recorded();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], calls[1]);
        assert_eq!(
            calls[0].1,
            ["-S", "--needed", "--noconfirm", "tlp", "thermald"]
        );
    }

    #[test]
    fn install_failure_is_an_error() {
        let exec = Arc::new(RecordingExecutor::failing(&["pacman"]));
        let ctx = make_context(
            Arc::clone(&exec) as Arc<dyn Executor>,
            Arc::clone(&exec) as Arc<dyn Executor>,
        );
        let err = install_packages(&ctx, &["no-such-package"]).unwrap_err();
        assert!(err.downcast_ref::<CommandError>().is_some());
    }

    /// Executor whose `which` always reports the program missing.
    #[derive(Debug, Default)]
    struct NoPathExecutor {
        calls: Mutex<Vec<String>>,
    }

    impl Executor for NoPathExecutor {
        fn invoke(
            &self,
            program: &str,
            _: &[&str],
            _: &Invocation<'_>,
        ) -> Result<ExecResult, CommandError> {
            self.calls
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(program.to_string());
            Ok(ExecResult {
                stdout: String::new(),
                stderr: String::new(),
                success: true,
                code: Some(0),
            })
        }

        fn which(&self, _: &str) -> bool {
            false
        }
    }

    #[test]
    fn aur_install_requires_helper_on_path() {
        let exec = Arc::new(NoPathExecutor::default());
        let ctx = make_context(
            Arc::new(RecordingExecutor::new()),
            Arc::clone(&exec) as Arc<dyn Executor>,
        );
        let err = install_aur_packages(&ctx, &["spotify"]).unwrap_err();
        assert!(err.to_string().contains("paru"));
        assert!(
            exec.calls
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .is_empty(),
            "nothing should run when the helper is missing"
        );
    }

    #[test]
    fn aur_install_runs_as_user_not_sudo() {
        let sudo = Arc::new(RecordingExecutor::new());
        let user = Arc::new(RecordingExecutor::new());
        let ctx = make_context(
            Arc::clone(&sudo) as Arc<dyn Executor>,
            Arc::clone(&user) as Arc<dyn Executor>,
        );
        install_aur_packages(&ctx, &["spotify"]).unwrap();
        assert!(sudo.recorded().is_empty());
        let calls = user.recorded();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "paru");
        assert_eq!(calls[0].1, ["-S", "--needed", "--noconfirm", "spotify"]);
    }

    #[test]
    fn aur_empty_list_skips_helper_check() {
        let exec = Arc::new(NoPathExecutor::default());
        let ctx = make_context(
            Arc::new(RecordingExecutor::new()),
            Arc::clone(&exec) as Arc<dyn Executor>,
        );
        install_aur_packages(&ctx, &[]).unwrap();
    }
}
