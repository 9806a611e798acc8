//! Shared helpers for module install logic.
//!
//! Modules express themselves in terms of these: run a privileged or
//! user command with its command line echoed and its output surfaced,
//! write a system file with a timestamped backup, enable or mask
//! systemd units.

use anyhow::Result;

use crate::error::CommandError;
use crate::exec::{ExecResult, Executor};
use crate::logging::Log;

use super::Context;

/// Render a command line for action echoing.
fn render(program: &str, args: &[&str]) -> String {
    if args.is_empty() {
        program.to_string()
    } else {
        format!("{program} {}", args.join(" "))
    }
}

/// Surface captured output on the logger.
///
/// stdout goes out as info, stderr as warnings. Nothing is printed for
/// empty streams.
pub fn surface(log: &dyn Log, result: &ExecResult) {
    let stdout = result.stdout.trim_end();
    if !stdout.is_empty() {
        log.info(stdout);
    }
    let stderr = result.stderr.trim_end();
    if !stderr.is_empty() {
        log.warn(stderr);
    }
}

fn logged_run(ctx: &Context, exec: &dyn Executor, program: &str, args: &[&str]) -> Result<()> {
    ctx.log.action(&render(program, args));
    let result = exec.run_unchecked(program, args)?;
    surface(ctx.log.as_ref(), &result);
    if result.success {
        Ok(())
    } else {
        Err(CommandError::Failed {
            program: program.to_string(),
            code: result.code.unwrap_or(-1),
            stdout: result.stdout,
            stderr: result.stderr,
        }
        .into())
    }
}

/// Run a privileged command, echoing it and surfacing its output.
///
/// # Errors
///
/// Fails when the command cannot spawn or exits non-zero.
pub fn sudo_run(ctx: &Context, program: &str, args: &[&str]) -> Result<()> {
    logged_run(ctx, ctx.sudo.as_ref(), program, args)
}

/// Run a command as the invoking user, echoing it and surfacing output.
///
/// # Errors
///
/// Fails when the command cannot spawn or exits non-zero.
pub fn user_run(ctx: &Context, program: &str, args: &[&str]) -> Result<()> {
    logged_run(ctx, ctx.user.as_ref(), program, args)
}

/// Whether `path` exists on the target system, probed with privileges.
///
/// # Errors
///
/// Fails only when the probe cannot spawn.
pub fn path_exists(ctx: &Context, path: &str) -> Result<bool> {
    let result = ctx.sudo.run_unchecked("test", &["-e", path])?;
    Ok(result.success)
}

/// Write `content` to a privileged path, backing up any existing file.
///
/// An existing file is first copied aside to `<path>.bak-<timestamp>`
/// with `cp -a`, then the new content is installed via
/// `install -Dm0644 /dev/stdin <path>`, which also creates missing
/// parent directories.
///
/// # Errors
///
/// Fails when the backup or the install command fails.
pub fn write_system_file(ctx: &Context, path: &str, content: &str) -> Result<()> {
    if path_exists(ctx, path)? {
        let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
        let backup = format!("{path}.bak-{stamp}");
        sudo_run(ctx, "cp", &["-a", path, &backup])?;
    }
    ctx.log.action(&format!("install -Dm0644 /dev/stdin {path}"));
    let result = ctx
        .sudo
        .run_with_stdin("install", &["-Dm0644", "/dev/stdin", path], content)?;
    surface(ctx.log.as_ref(), &result);
    if result.success {
        Ok(())
    } else {
        Err(CommandError::Failed {
            program: "install".to_string(),
            code: result.code.unwrap_or(-1),
            stdout: result.stdout,
            stderr: result.stderr,
        }
        .into())
    }
}

/// Enable system units, optionally starting them immediately (`--now`).
///
/// # Errors
///
/// Fails at the first unit `systemctl` rejects.
pub fn enable_system_units(ctx: &Context, units: &[&str], now: bool) -> Result<()> {
    for unit in units {
        if now {
            sudo_run(ctx, "systemctl", &["enable", "--now", unit])?;
        } else {
            sudo_run(ctx, "systemctl", &["enable", unit])?;
        }
    }
    Ok(())
}

/// Mask a system unit so nothing can start it.
///
/// # Errors
///
/// Fails when `systemctl` rejects the mask.
pub fn mask_system_unit(ctx: &Context, unit: &str) -> Result<()> {
    sudo_run(ctx, "systemctl", &["mask", unit])
}

/// Enable user units with `systemctl --user`, best effort.
///
/// User sessions are frequently absent when provisioning runs from a
/// console or over ssh; failures here are warnings, never fatal.
pub fn enable_user_units(ctx: &Context, units: &[&str]) {
    for unit in units {
        ctx.log
            .action(&render("systemctl", &["--user", "enable", "--now", unit]));
        match ctx.user.run_unchecked("systemctl", &["--user", "enable", "--now", unit]) {
            Ok(result) if result.success => {}
            Ok(result) => {
                surface(ctx.log.as_ref(), &result);
                ctx.log
                    .warn(&format!("could not enable user unit {unit}, continuing"));
            }
            Err(e) => ctx.log.warn(&format!("could not enable user unit {unit}: {e}")),
        }
    }
}
