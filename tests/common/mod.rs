//! Shared fixtures for the integration tests.
#![allow(dead_code, clippy::unwrap_used)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use archup_cli::error::CommandError;
use archup_cli::exec::{ExecResult, Executor, Invocation};
use archup_cli::logging::{Log, ModuleStatus};
use archup_cli::modules::Context;

/// Logger that discards everything.
#[derive(Debug, Default)]
pub struct QuietLog;

impl Log for QuietLog {
    fn error(&self, _: &str) {}
    fn warn(&self, _: &str) {}
    fn stage(&self, _: &str) {}
    fn info(&self, _: &str) {}
    fn debug(&self, _: &str) {}
    fn action(&self, _: &str) {}
    fn record_module(&self, _: &str, _: ModuleStatus, _: Option<&str>) {}
    fn failure_count(&self) -> usize {
        0
    }
}

/// Executor recording every `(program, args)` pair. Programs listed in
/// `fail_programs` report failure instead of success.
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    calls: Mutex<Vec<(String, Vec<String>)>>,
    fail_programs: Vec<String>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(programs: &[&str]) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_programs: programs.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    pub fn recorded(&self) -> Vec<(String, Vec<String>)> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// True if some recorded call matches `program` and contains `needle`.
    pub fn saw(&self, program: &str, needle: &str) -> bool {
        self.recorded()
            .iter()
            .any(|(p, args)| p == program && args.iter().any(|a| a == needle))
    }

    /// Index of the first recorded call matching `program` and `needle`.
    pub fn position(&self, program: &str, needle: &str) -> Option<usize> {
        self.recorded()
            .iter()
            .position(|(p, args)| p == program && args.iter().any(|a| a == needle))
    }
}

impl Executor for RecordingExecutor {
    fn invoke(
        &self,
        program: &str,
        args: &[&str],
        opts: &Invocation<'_>,
    ) -> Result<ExecResult, CommandError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((
                program.to_string(),
                args.iter().map(|s| (*s).to_string()).collect(),
            ));
        let fail = self.fail_programs.iter().any(|p| p == program);
        if fail && opts.check {
            return Err(CommandError::Failed {
                program: program.to_string(),
                code: 1,
                stdout: String::new(),
                stderr: "scripted failure".to_string(),
            });
        }
        Ok(ExecResult {
            stdout: String::new(),
            stderr: String::new(),
            success: !fail,
            code: Some(i32::from(fail)),
        })
    }

    fn which(&self, _: &str) -> bool {
        true
    }
}

/// Write a module folder with the given manifest under `root`.
pub fn write_module(root: &Path, name: &str, manifest: &str) -> PathBuf {
    let dir = root.join(name);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("module.toml"), manifest).unwrap();
    dir
}

/// Context where both executors are the same recorder and nothing logs.
pub fn recording_context() -> (Context, Arc<RecordingExecutor>) {
    let exec = Arc::new(RecordingExecutor::new());
    let ctx = Context::with_home(
        Arc::new(QuietLog),
        Arc::clone(&exec) as Arc<dyn Executor>,
        Arc::clone(&exec) as Arc<dyn Executor>,
        PathBuf::from("/home/test"),
    );
    (ctx, exec)
}

/// Context backed by a caller-supplied executor for both roles.
pub fn context_with(exec: Arc<RecordingExecutor>) -> Context {
    Context::with_home(
        Arc::new(QuietLog),
        Arc::clone(&exec) as Arc<dyn Executor>,
        Arc::clone(&exec) as Arc<dyn Executor>,
        PathBuf::from("/home/test"),
    )
}
