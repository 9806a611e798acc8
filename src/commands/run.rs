//! The `run` command: discover, validate, and execute modules under a
//! single sudo session.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use crate::cli::{GlobalOpts, RunOpts};
use crate::exec::{Executor, SystemExecutor};
use crate::logging::{Log, Logger, ModuleStatus};
use crate::modules::{self, Context, ModuleDescriptor};
use crate::platform::Platform;
use crate::sudo::SudoSession;

use super::{ensure_supported_platform, resolve_modules_root};

fn matches_any(name: &str, needles: &[String]) -> bool {
    needles
        .iter()
        .any(|n| !n.is_empty() && name.contains(n.as_str()))
}

/// Apply `--only` and `--skip` selection. Filtered modules are recorded
/// as skipped so the summary still accounts for them.
fn select(all: Vec<ModuleDescriptor>, opts: &RunOpts, log: &dyn Log) -> Vec<ModuleDescriptor> {
    let mut selected = Vec::with_capacity(all.len());
    for module in all {
        if !opts.only.is_empty() && !matches_any(&module.name, &opts.only) {
            log.record_module(
                &module.name,
                ModuleStatus::Skipped,
                Some("not selected by --only"),
            );
            continue;
        }
        if matches_any(&module.name, &opts.skip) {
            log.record_module(&module.name, ModuleStatus::Skipped, Some("--skip"));
            continue;
        }
        selected.push(module);
    }
    selected
}

fn print_plan(plan: &[ModuleDescriptor], log: &dyn Log) {
    log.stage("Execution plan (dry run)");
    for module in plan {
        let line = match &module.description {
            Some(desc) => format!("[{}] {}: {desc}", module.order, module.name),
            None => format!("[{}] {}", module.order, module.name),
        };
        log.info(&line);
    }
}

/// Execute a full provisioning run.
///
/// Order collisions are fatal before anything executes. A module failure
/// stops the run; the remaining modules are reported as skipped and the
/// failure becomes the process exit status.
///
/// # Errors
///
/// Fails on a non-Arch host, on duplicate order numbers, or when a
/// module's install entry point fails.
pub fn run(global: &GlobalOpts, opts: &RunOpts, log: &Arc<Logger>) -> Result<()> {
    ensure_supported_platform(&Platform::detect())?;

    let root = resolve_modules_root(global);
    log.stage(&format!("Discovering modules in {}", root.display()));

    let registry = modules::registry();
    let discovered = modules::discover(&root, &registry, log.as_ref());
    modules::validate_unique_orders(&discovered)?;

    let selected = select(discovered, opts, log.as_ref());
    if selected.is_empty() {
        log.info("no modules to run");
        return Ok(());
    }

    if global.dry_run {
        print_plan(&selected, log.as_ref());
        return Ok(());
    }

    let log_dyn: Arc<dyn Log> = Arc::clone(log) as Arc<dyn Log>;
    let system: Arc<dyn Executor> = Arc::new(SystemExecutor);
    let mut session = SudoSession::start(
        Arc::clone(&system),
        Arc::clone(&log_dyn),
        Duration::from_secs(global.keepalive_secs),
    );

    let ctx = Context::new(
        Arc::clone(&log_dyn),
        Arc::new(session.executor()),
        Arc::clone(&system),
    )?;

    let result = modules::run_all(&selected, &ctx);
    session.close();

    let report = result?;
    for name in &report.not_run {
        log.record_module(name, ModuleStatus::Skipped, Some("earlier module failed"));
    }
    log.print_summary();

    match report.failed {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    use super::*;

    fn ok_install(_: &Context, _: &Path) -> Result<()> {
        Ok(())
    }

    fn module(order: u32, name: &str) -> ModuleDescriptor {
        ModuleDescriptor {
            order,
            name: name.to_string(),
            dir: PathBuf::from("/tmp/none"),
            description: None,
            install: ok_install,
        }
    }

    /// Log that captures skipped-module recordings.
    #[derive(Default)]
    struct SkipLog {
        skipped: Mutex<Vec<(String, String)>>,
    }

    impl std::fmt::Debug for SkipLog {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("SkipLog").finish_non_exhaustive()
        }
    }

    impl Log for SkipLog {
        fn error(&self, _: &str) {}
        fn warn(&self, _: &str) {}
        fn stage(&self, _: &str) {}
        fn info(&self, _: &str) {}
        fn debug(&self, _: &str) {}
        fn action(&self, _: &str) {}
        fn record_module(&self, name: &str, status: ModuleStatus, message: Option<&str>) {
            if status == ModuleStatus::Skipped {
                self.skipped
                    .lock()
                    .unwrap_or_else(std::sync::PoisonError::into_inner)
                    .push((name.to_string(), message.unwrap_or("").to_string()));
            }
        }
        fn failure_count(&self) -> usize {
            0
        }
    }

    fn opts(skip: &[&str], only: &[&str]) -> RunOpts {
        RunOpts {
            skip: skip.iter().map(|s| (*s).to_string()).collect(),
            only: only.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    #[test]
    fn no_filters_selects_everything() {
        let log = SkipLog::default();
        let all = vec![module(0, "0_core"), module(10, "10_power")];
        let selected = select(all, &opts(&[], &[]), &log);
        assert_eq!(selected.len(), 2);
        assert!(log.skipped.lock().unwrap().is_empty());
    }

    #[test]
    fn skip_filters_by_substring() {
        let log = SkipLog::default();
        let all = vec![module(0, "0_core"), module(10, "10_power")];
        let selected = select(all, &opts(&["power"], &[]), &log);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].name, "0_core");
        let skipped = log.skipped.lock().unwrap();
        assert_eq!(skipped[0].0, "10_power");
    }

    #[test]
    fn only_keeps_matching_modules() {
        let log = SkipLog::default();
        let all = vec![
            module(0, "0_core"),
            module(10, "10_power"),
            module(20, "20_gpu"),
        ];
        let selected = select(all, &opts(&[], &["power", "gpu"]), &log);
        assert_eq!(selected.len(), 2);
        assert_eq!(log.skipped.lock().unwrap().len(), 1);
    }

    #[test]
    fn skip_wins_over_only() {
        let log = SkipLog::default();
        let all = vec![module(10, "10_power")];
        let selected = select(all, &opts(&["power"], &["power"]), &log);
        assert!(selected.is_empty());
    }

    #[test]
    fn empty_needles_never_match() {
        assert!(!matches_any("10_power", &[String::new()]));
    }
}
