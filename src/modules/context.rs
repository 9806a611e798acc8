use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;

use crate::exec::Executor;
use crate::logging::Log;

/// Shared context handed to every module's install entry point.
pub struct Context {
    /// Logger for output and module status recording.
    pub log: Arc<dyn Log>,
    /// Privileged executor; every command runs under the sudo session.
    pub sudo: Arc<dyn Executor>,
    /// Unprivileged executor for commands that must run as the invoking
    /// user (AUR helper, `systemctl --user`).
    pub user: Arc<dyn Executor>,
    /// The invoking user's home directory.
    pub home: PathBuf,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("log", &"<dyn Log>")
            .field("sudo", &"<dyn Executor>")
            .field("user", &"<dyn Executor>")
            .field("home", &self.home)
            .finish()
    }
}

impl Context {
    /// Creates a new context for module execution.
    ///
    /// # Errors
    ///
    /// Returns an error if the HOME environment variable is not set.
    pub fn new(log: Arc<dyn Log>, sudo: Arc<dyn Executor>, user: Arc<dyn Executor>) -> Result<Self> {
        let home = std::env::var("HOME")
            .map_err(|_| anyhow::anyhow!("HOME environment variable is not set"))?;
        Ok(Self {
            log,
            sudo,
            user,
            home: PathBuf::from(home),
        })
    }

    /// Create a context with an explicit home directory.
    ///
    /// Used by tests and by callers that already resolved the home path.
    #[must_use]
    pub fn with_home(
        log: Arc<dyn Log>,
        sudo: Arc<dyn Executor>,
        user: Arc<dyn Executor>,
        home: PathBuf,
    ) -> Self {
        Self {
            log,
            sudo,
            user,
            home,
        }
    }
}
