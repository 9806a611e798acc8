//! Terminal and file logging for provisioning runs.
//!
//! All messages are always written to a persistent log file at
//! `$XDG_CACHE_HOME/archup/provision.log` (default `~/.cache/archup/provision.log`)
//! with timestamps and ANSI codes stripped, regardless of the verbose flag.
#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

/// Final status of a provisioning module, for summary reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleStatus {
    /// The module's install entry point completed successfully.
    Ok,
    /// The module was not run (filtered out, or excluded at discovery).
    Skipped,
    /// The module's install entry point reported failure.
    Failed,
}

/// One recorded module result.
#[derive(Debug, Clone)]
pub struct ModuleEntry {
    /// Module folder name, e.g. `110_power`.
    pub name: String,
    /// Outcome of the module.
    pub status: ModuleStatus,
    /// Optional human-readable detail (failure reason, skip reason).
    pub message: Option<String>,
}

/// Logging seam used throughout the engine.
///
/// Production code uses [`Logger`]; tests inject capturing implementations.
pub trait Log: Send + Sync {
    /// An error that the operator must see.
    fn error(&self, msg: &str);
    /// A non-fatal problem.
    fn warn(&self, msg: &str);
    /// A top-level stage header.
    fn stage(&self, msg: &str);
    /// Ordinary progress output.
    fn info(&self, msg: &str);
    /// Detail output, shown on the terminal only in verbose mode.
    fn debug(&self, msg: &str);
    /// Echo of an external command about to be executed, `$`-prefixed.
    fn action(&self, msg: &str);
    /// Record a module result for the end-of-run summary.
    fn record_module(&self, name: &str, status: ModuleStatus, message: Option<&str>);
    /// Number of modules recorded as [`ModuleStatus::Failed`].
    fn failure_count(&self) -> usize;
}

/// Structured logger with summary collection and a persistent log file.
pub struct Logger {
    verbose: bool,
    entries: Mutex<Vec<ModuleEntry>>,
    log_file: Option<PathBuf>,
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("verbose", &self.verbose)
            .field("log_file", &self.log_file)
            .finish_non_exhaustive()
    }
}

/// Return the log file path under `$XDG_CACHE_HOME/archup/` (or `~/.cache/archup/`).
fn log_file_path() -> Option<PathBuf> {
    let cache_dir = std::env::var("XDG_CACHE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".cache")
        });
    let dir = cache_dir.join("archup");
    fs::create_dir_all(&dir).ok()?;
    Some(dir.join("provision.log"))
}

/// Strip ANSI escape sequences from a string.
fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            // Skip until 'm' (end of SGR sequence)
            for inner in chars.by_ref() {
                if inner == 'm' {
                    break;
                }
            }
        } else {
            out.push(c);
        }
    }
    out
}

impl Logger {
    /// Create a logger, truncating the persistent log file for a fresh run.
    #[must_use]
    pub fn new(verbose: bool) -> Self {
        let log_file = log_file_path();

        if let Some(ref path) = log_file {
            let version =
                option_env!("ARCHUP_VERSION").unwrap_or(concat!("dev-", env!("CARGO_PKG_VERSION")));
            let header = format!(
                "==========================================\n\
                 archup {version} {}\n\
                 ==========================================\n",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            );
            let _ = fs::write(path, header);
        }

        Self {
            verbose,
            entries: Mutex::new(Vec::new()),
            log_file,
        }
    }

    /// Append a line to the persistent log file.
    fn write_to_file(&self, level: &str, msg: &str) {
        if let Some(ref path) = self.log_file
            && let Ok(mut f) = fs::OpenOptions::new().append(true).open(path)
        {
            let ts = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
            let clean = strip_ansi(msg);
            let _ = writeln!(f, "{ts} {level} {clean}");
        }
    }

    /// Return the log file path, if available.
    #[cfg(test)]
    pub fn log_path(&self) -> Option<&PathBuf> {
        self.log_file.as_ref()
    }

    fn entries_locked(&self) -> std::sync::MutexGuard<'_, Vec<ModuleEntry>> {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Print the summary of all recorded modules.
    pub fn print_summary(&self) {
        let entries = self.entries_locked();
        if entries.is_empty() {
            return;
        }

        println!();
        self.stage("Summary");

        let mut ok = 0u32;
        let mut skipped = 0u32;
        let mut failed = 0u32;

        for entry in entries.iter() {
            let (icon, color) = match entry.status {
                ModuleStatus::Ok => {
                    ok += 1;
                    ("✓", "\x1b[32m")
                }
                ModuleStatus::Skipped => {
                    skipped += 1;
                    ("○", "\x1b[33m")
                }
                ModuleStatus::Failed => {
                    failed += 1;
                    ("✗", "\x1b[31m")
                }
            };

            let suffix = match &entry.message {
                Some(msg) => format!(" ({msg})"),
                None => String::new(),
            };

            let line = format!("{icon} {}{suffix}", entry.name);
            println!("  {color}{line}\x1b[0m");
            self.write_to_file("INF", &line);
        }

        println!();
        let total = ok + skipped + failed;
        let totals = format!("{total} modules: {ok} ok, {skipped} skipped, {failed} failed");
        println!(
            "  {total} modules: \x1b[32m{ok} ok\x1b[0m, \x1b[33m{skipped} skipped\x1b[0m, \x1b[31m{failed} failed\x1b[0m"
        );
        self.write_to_file("INF", &totals);

        if failed == 0 {
            println!("  \x1b[1;32moverall result: success\x1b[0m");
            self.write_to_file("INF", "overall result: success");
        } else {
            println!("  \x1b[1;31moverall result: failure\x1b[0m");
            self.write_to_file("INF", "overall result: failure");
        }

        if let Some(path) = &self.log_file {
            println!("  \x1b[2mlog: {}\x1b[0m", path.display());
            self.write_to_file("INF", &format!("log: {}", path.display()));
        }
    }
}

impl Log for Logger {
    fn error(&self, msg: &str) {
        eprintln!("\x1b[31mERROR\x1b[0m {msg}");
        self.write_to_file("ERR", msg);
    }

    fn warn(&self, msg: &str) {
        eprintln!("\x1b[33mWARN\x1b[0m  {msg}");
        self.write_to_file("WRN", msg);
    }

    fn stage(&self, msg: &str) {
        println!("\x1b[1;34m==>\x1b[0m \x1b[1m{msg}\x1b[0m");
        self.write_to_file("STG", msg);
    }

    fn info(&self, msg: &str) {
        println!("  {msg}");
        self.write_to_file("INF", msg);
    }

    fn debug(&self, msg: &str) {
        if self.verbose {
            println!("  \x1b[2m{msg}\x1b[0m");
        }
        // Always log debug to file, even when not verbose on terminal
        self.write_to_file("DBG", msg);
    }

    fn action(&self, msg: &str) {
        println!("  \x1b[2m$ {msg}\x1b[0m");
        self.write_to_file("CMD", &format!("$ {msg}"));
    }

    fn record_module(&self, name: &str, status: ModuleStatus, message: Option<&str>) {
        self.entries_locked().push(ModuleEntry {
            name: name.to_string(),
            status,
            message: message.map(String::from),
        });
    }

    fn failure_count(&self) -> usize {
        self.entries_locked()
            .iter()
            .filter(|e| e.status == ModuleStatus::Failed)
            .count()
    }
}
