//! Ordered module execution.

use crate::error::{DuplicateOrderError, ModuleError};

use super::{Context, ModuleDescriptor};

/// Outcome of a full run.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Names of modules that completed successfully, in execution order.
    pub completed: Vec<String>,
    /// The failure that stopped the run, if any.
    pub failed: Option<ModuleError>,
    /// Names of modules that never ran because an earlier one failed.
    pub not_run: Vec<String>,
}

impl RunReport {
    /// True when every module completed.
    #[must_use]
    pub const fn success(&self) -> bool {
        self.failed.is_none()
    }
}

/// Group modules by colliding order numbers.
///
/// Returns one `(order, names)` entry per order shared by two or more
/// modules, ascending, names sorted.
#[must_use]
pub fn duplicate_orders(modules: &[ModuleDescriptor]) -> Vec<(u32, Vec<String>)> {
    let mut by_order: std::collections::BTreeMap<u32, Vec<String>> =
        std::collections::BTreeMap::new();
    for m in modules {
        by_order.entry(m.order).or_default().push(m.name.clone());
    }
    by_order
        .into_iter()
        .filter(|(_, names)| names.len() > 1)
        .map(|(order, mut names)| {
            names.sort();
            (order, names)
        })
        .collect()
}

/// Reject module sets with colliding order numbers.
///
/// # Errors
///
/// Returns [`DuplicateOrderError`] listing every collision. Callers must
/// treat this as fatal before executing anything.
pub fn validate_unique_orders(modules: &[ModuleDescriptor]) -> Result<(), DuplicateOrderError> {
    let collisions = duplicate_orders(modules);
    if collisions.is_empty() {
        Ok(())
    } else {
        Err(DuplicateOrderError { collisions })
    }
}

/// Run `modules` ascending, stopping at the first failure.
///
/// Order uniqueness is validated first; on collision nothing executes.
/// Each module is announced as a stage and its outcome recorded on the
/// context's logger, so the end-of-run summary reflects exactly what
/// happened.
///
/// # Errors
///
/// Returns [`DuplicateOrderError`] when two modules share an order. A
/// module failure does not error; it is carried in the report.
pub fn run_all(
    modules: &[ModuleDescriptor],
    ctx: &Context,
) -> Result<RunReport, DuplicateOrderError> {
    validate_unique_orders(modules)?;

    let mut report = RunReport::default();
    let mut iter = modules.iter();
    for module in iter.by_ref() {
        ctx.log.stage(&format!("[{}] {}", module.order, module.name));
        match (module.install)(ctx, &module.dir) {
            Ok(()) => {
                ctx.log
                    .record_module(&module.name, crate::logging::ModuleStatus::Ok, None);
                report.completed.push(module.name.clone());
            }
            Err(e) => {
                let reason = format!("{e:#}");
                ctx.log.error(&format!("module '{}' failed: {reason}", module.name));
                ctx.log.record_module(
                    &module.name,
                    crate::logging::ModuleStatus::Failed,
                    Some(&reason),
                );
                report.failed = Some(ModuleError {
                    module: module.name.clone(),
                    reason,
                });
                break;
            }
        }
    }
    for module in iter {
        report.not_run.push(module.name.clone());
    }
    Ok(report)
}
