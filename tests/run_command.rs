//! End-to-end runs: discover a module tree on disk, validate ordering,
//! and execute against a recording executor.

mod common;

use std::sync::Arc;

use archup_cli::modules::{discover, registry, run_all, validate_unique_orders};
use common::{QuietLog, RecordingExecutor};

#[test]
#[allow(clippy::unwrap_used)]
fn modules_execute_in_ascending_order() {
    let tmp = tempfile::tempdir().unwrap();
    // Created out of order on purpose.
    common::write_module(tmp.path(), "200_fonts", "");
    common::write_module(tmp.path(), "10_panels", "");

    let found = discover(tmp.path(), &registry(), &QuietLog);
    let (ctx, exec) = common::recording_context();
    let report = run_all(&found, &ctx).unwrap();

    assert!(report.success());
    assert_eq!(report.completed, ["10_panels", "200_fonts"]);
    let panels = exec.position("pacman", "polybar").unwrap();
    let fonts = exec.position("pacman", "fontconfig").unwrap();
    assert!(panels < fonts, "panels must run before fonts");
}

#[test]
#[allow(clippy::unwrap_used)]
fn duplicate_orders_execute_nothing() {
    let tmp = tempfile::tempdir().unwrap();
    common::write_module(tmp.path(), "10_panels", "");
    common::write_module(tmp.path(), "10_fonts", "");

    let found = discover(tmp.path(), &registry(), &QuietLog);
    let err = validate_unique_orders(&found).unwrap_err();
    assert!(err.to_string().contains("10"));

    let (ctx, exec) = common::recording_context();
    assert!(run_all(&found, &ctx).is_err());
    assert!(exec.recorded().is_empty(), "no command may run on collision");
}

#[test]
#[allow(clippy::unwrap_used)]
fn failure_stops_the_run_and_reports_the_rest() {
    let tmp = tempfile::tempdir().unwrap();
    common::write_module(tmp.path(), "10_panels", "");
    common::write_module(tmp.path(), "20_fonts", "");

    let found = discover(tmp.path(), &registry(), &QuietLog);
    let exec = Arc::new(RecordingExecutor::failing(&["pacman"]));
    let ctx = common::context_with(Arc::clone(&exec));
    let report = run_all(&found, &ctx).unwrap();

    assert!(!report.success());
    let failed = report.failed.unwrap();
    assert_eq!(failed.module, "10_panels");
    assert_eq!(report.not_run, ["20_fonts"]);
    assert!(
        !exec.saw("pacman", "fontconfig"),
        "fonts must not run after panels failed"
    );
}

#[test]
#[allow(clippy::unwrap_used)]
fn empty_tree_runs_successfully() {
    let tmp = tempfile::tempdir().unwrap();
    let found = discover(tmp.path(), &registry(), &QuietLog);
    let (ctx, exec) = common::recording_context();
    let report = run_all(&found, &ctx).unwrap();
    assert!(report.success());
    assert!(exec.recorded().is_empty());
}
