//! Seeded, keep-alive sudo session.
//!
//! [`SudoSession::start`] prompts once for credentials by running an
//! interactive `sudo -v` on the terminal — the password never enters this
//! process. A background thread then refreshes the timestamp with
//! `sudo -n -v` on a fixed interval until [`SudoSession::close`] revokes
//! the grant with `sudo -K`. Every privileged command goes through
//! [`SudoExecutor`], which prefixes `sudo -n` so nothing can ever block on
//! a password prompt mid-run: an expired grant fails fast instead.

use std::sync::Arc;
use std::sync::mpsc;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::error::{CommandError, SudoError};
use crate::exec::{ExecResult, Executor, Invocation};
use crate::logging::Log;

/// Lower bound on the keep-alive refresh interval.
///
/// Refreshing more often than this is pointless; sudo's default timestamp
/// timeout is measured in minutes.
pub const MIN_KEEPALIVE: Duration = Duration::from_secs(10);

/// A live privileged session with a background keep-alive thread.
///
/// Closing is idempotent and also happens on drop, so the grant is not
/// left dangling on early returns. Callers should still close explicitly;
/// the drop path is a safety net, not the contract.
pub struct SudoSession {
    executor: Arc<dyn Executor>,
    log: Arc<dyn Log>,
    stop: Option<mpsc::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for SudoSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SudoSession")
            .field("keepalive_running", &self.handle.is_some())
            .finish_non_exhaustive()
    }
}

impl SudoSession {
    /// Seed the sudo timestamp and start the keep-alive thread.
    ///
    /// Seeding failure is deliberately non-fatal: a warning is logged and
    /// the session is still returned, but every privileged call will then
    /// fail fast since `-n` never prompts.
    #[must_use]
    pub fn start(executor: Arc<dyn Executor>, log: Arc<dyn Log>, keepalive: Duration) -> Self {
        log.action("sudo -v");
        match executor.run_streamed("sudo", &["-v"]) {
            Ok(result) if result.success => {}
            Ok(result) => {
                let e = SudoError::SeedFailed(format!(
                    "sudo -v exited {}",
                    result.code.unwrap_or(-1)
                ));
                log.warn(&format!("{e}; privileged commands will fail"));
            }
            Err(e) => {
                let e = SudoError::SeedFailed(e.to_string());
                log.warn(&format!("{e}; privileged commands will fail"));
            }
        }

        let interval = keepalive.max(MIN_KEEPALIVE);
        let (tx, rx) = mpsc::channel::<()>();
        let refresh_exec = Arc::clone(&executor);
        let handle = std::thread::Builder::new()
            .name("sudo-keepalive".to_string())
            .spawn(move || {
                loop {
                    // -n: an expired timestamp must never block on a prompt.
                    let _ = refresh_exec.run_unchecked("sudo", &["-n", "-v"]);
                    match rx.recv_timeout(interval) {
                        Err(mpsc::RecvTimeoutError::Timeout) => {}
                        // Sender dropped or explicit stop: wake immediately.
                        Ok(()) | Err(mpsc::RecvTimeoutError::Disconnected) => break,
                    }
                }
            });

        let handle = match handle {
            Ok(h) => Some(h),
            Err(e) => {
                log.warn(&format!(
                    "could not start sudo keep-alive thread: {e}; the grant may expire mid-run"
                ));
                None
            }
        };

        Self {
            executor,
            log,
            stop: Some(tx),
            handle,
        }
    }

    /// A privileged executor bound to this session.
    #[must_use]
    pub fn executor(&self) -> SudoExecutor {
        SudoExecutor::new(Arc::clone(&self.executor))
    }

    /// Stop the keep-alive thread and revoke the grant.
    ///
    /// Safe to call more than once; only the first call does any work.
    /// The keep-alive thread wakes immediately when the stop channel is
    /// dropped, so the join is bounded by one refresh call.
    pub fn close(&mut self) {
        let Some(stop) = self.stop.take() else {
            return;
        };
        drop(stop);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
        self.log.action("sudo -K");
        let _ = self.executor.run_unchecked("sudo", &["-K"]);
    }
}

impl Drop for SudoSession {
    fn drop(&mut self) {
        self.close();
    }
}

/// Best-effort interrupt safety net: revoke the grant on Ctrl-C.
///
/// Registered once by the binary before a session exists, so it shells out
/// directly rather than holding a session reference.
pub fn register_interrupt_revoke() {
    let _ = ctrlc::set_handler(|| {
        let _ = std::process::Command::new("sudo").arg("-K").status();
        std::process::exit(130);
    });
}

/// Executor that runs every command under the seeded sudo session.
///
/// Prefixes each invocation with `sudo -n`; cwd, env, stdin, and the
/// check/capture flags pass through to the wrapped executor unchanged.
#[derive(Clone)]
pub struct SudoExecutor {
    inner: Arc<dyn Executor>,
}

impl std::fmt::Debug for SudoExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SudoExecutor").finish_non_exhaustive()
    }
}

impl SudoExecutor {
    /// Wrap an executor so every command is prefixed with `sudo -n`.
    #[must_use]
    pub fn new(inner: Arc<dyn Executor>) -> Self {
        Self { inner }
    }
}

impl Executor for SudoExecutor {
    fn invoke(
        &self,
        program: &str,
        args: &[&str],
        opts: &Invocation<'_>,
    ) -> Result<ExecResult, CommandError> {
        let mut full = Vec::with_capacity(args.len() + 2);
        full.push("-n");
        full.push(program);
        full.extend_from_slice(args);
        self.inner.invoke("sudo", &full, opts)
    }

    fn which(&self, program: &str) -> bool {
        self.inner.which(program)
    }
}
