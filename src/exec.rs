//! External command invocation.
//!
//! Everything side-effecting in this engine is an external command:
//! `pacman`, `systemctl`, `install`, `tee`, and friends. The [`Executor`]
//! trait is the seam between module logic and the real system, so tests
//! can record command lines instead of running them. The production
//! implementation is [`SystemExecutor`]; privileged execution wraps any
//! executor in [`crate::sudo::SudoExecutor`].

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use crate::error::CommandError;

/// Result of a command execution.
#[derive(Debug, Clone)]
pub struct ExecResult {
    /// Captured stdout, empty when the command streamed to the terminal.
    pub stdout: String,
    /// Captured stderr, empty when the command streamed to the terminal.
    pub stderr: String,
    /// Whether the command exited with status zero.
    pub success: bool,
    /// Raw exit code, `None` when terminated by a signal.
    pub code: Option<i32>,
}

impl From<Output> for ExecResult {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        }
    }
}

/// Behaviour flags and optional payload for a single command invocation.
#[derive(Debug, Clone, Copy)]
pub struct Invocation<'a> {
    /// Return a [`CommandError::Failed`] when the exit status is non-zero.
    pub check: bool,
    /// Capture stdout/stderr instead of streaming them to the terminal.
    pub capture: bool,
    /// Working directory, or inherit the current one.
    pub cwd: Option<&'a Path>,
    /// Extra environment variables.
    pub env: &'a [(&'a str, &'a str)],
    /// Text piped to the child's stdin.
    pub stdin: Option<&'a str>,
}

impl Default for Invocation<'_> {
    /// Checked and captured. Note this is not a plain streamed run:
    /// commands that should keep the terminal (pacman progress, sudo
    /// prompts) go through [`Executor::run_streamed`], which clears
    /// `capture`.
    fn default() -> Self {
        Self {
            check: true,
            capture: true,
            cwd: None,
            env: &[],
            stdin: None,
        }
    }
}

/// Command execution seam.
///
/// The provided methods cover the common shapes; implementors only supply
/// [`Executor::invoke`] and [`Executor::which`].
pub trait Executor: Send + Sync {
    /// Execute `program` with `args` according to `opts`.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::Spawn`] if the process cannot be started and
    /// [`CommandError::Failed`] if `opts.check` is set and the exit status
    /// is non-zero. With `opts.check` false this never fails on exit
    /// status; the result's fields reflect the actual outcome.
    fn invoke(&self, program: &str, args: &[&str], opts: &Invocation<'_>)
    -> Result<ExecResult, CommandError>;

    /// Check if a program is available on PATH.
    fn which(&self, program: &str) -> bool;

    /// Run a command with captured output, failing on non-zero exit.
    ///
    /// # Errors
    ///
    /// See [`Executor::invoke`].
    fn run(&self, program: &str, args: &[&str]) -> Result<ExecResult, CommandError> {
        self.invoke(program, args, &Invocation::default())
    }

    /// Run a command with captured output, never failing on exit status.
    ///
    /// # Errors
    ///
    /// Only fails when the process cannot be spawned.
    fn run_unchecked(&self, program: &str, args: &[&str]) -> Result<ExecResult, CommandError> {
        self.invoke(
            program,
            args,
            &Invocation {
                check: false,
                ..Invocation::default()
            },
        )
    }

    /// Run a command streaming its output to the terminal, never failing on
    /// exit status. Used for long, chatty operations (pacman, makepkg).
    ///
    /// # Errors
    ///
    /// Only fails when the process cannot be spawned.
    fn run_streamed(&self, program: &str, args: &[&str]) -> Result<ExecResult, CommandError> {
        self.invoke(
            program,
            args,
            &Invocation {
                check: false,
                capture: false,
                ..Invocation::default()
            },
        )
    }

    /// Run a command with `stdin` piped from `input`, captured output, no
    /// exit-status check.
    ///
    /// # Errors
    ///
    /// Only fails when the process cannot be spawned.
    fn run_with_stdin(
        &self,
        program: &str,
        args: &[&str],
        input: &str,
    ) -> Result<ExecResult, CommandError> {
        self.invoke(
            program,
            args,
            &Invocation {
                check: false,
                stdin: Some(input),
                ..Invocation::default()
            },
        )
    }
}

/// Production executor that spawns real processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemExecutor;

impl Executor for SystemExecutor {
    fn invoke(
        &self,
        program: &str,
        args: &[&str],
        opts: &Invocation<'_>,
    ) -> Result<ExecResult, CommandError> {
        let mut cmd = Command::new(program);
        cmd.args(args);
        if let Some(dir) = opts.cwd {
            cmd.current_dir(dir);
        }
        for (k, v) in opts.env {
            cmd.env(k, v);
        }

        // Interactive/streamed commands keep the terminal; captured ones get
        // a closed stdin so nothing can block waiting for input.
        if opts.stdin.is_some() {
            cmd.stdin(Stdio::piped());
        } else if opts.capture {
            cmd.stdin(Stdio::null());
        } else {
            cmd.stdin(Stdio::inherit());
        }
        if opts.capture {
            cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
        } else {
            cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
        }

        let mut child = cmd.spawn().map_err(|source| CommandError::Spawn {
            program: program.to_string(),
            source,
        })?;

        // The whole payload is written before the output pipes are
        // drained. That holds only while payloads stay well under the
        // pipe buffer (small config files); anything larger needs this
        // write moved to a separate thread.
        if let Some(input) = opts.stdin
            && let Some(mut stdin) = child.stdin.take()
        {
            stdin
                .write_all(input.as_bytes())
                .map_err(|source| CommandError::Spawn {
                    program: program.to_string(),
                    source,
                })?;
            // Dropping the handle closes the pipe so the child sees EOF.
        }

        let output = child
            .wait_with_output()
            .map_err(|source| CommandError::Spawn {
                program: program.to_string(),
                source,
            })?;
        let result = ExecResult::from(output);

        if opts.check && !result.success {
            return Err(CommandError::Failed {
                program: program.to_string(),
                code: result.code.unwrap_or(-1),
                stdout: result.stdout,
                stderr: result.stderr,
            });
        }
        Ok(result)
    }

    fn which(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}
