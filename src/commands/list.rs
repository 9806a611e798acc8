//! The `list` command: show discovered modules and surface ordering
//! problems without executing anything.

use anyhow::Result;

use crate::cli::GlobalOpts;
use crate::logging::Log;
use crate::modules;

use super::resolve_modules_root;

/// List every discovered module in execution order.
///
/// Unlike `run`, this works on any host: inspecting a modules tree does
/// not need Arch Linux or sudo.
///
/// # Errors
///
/// Fails when two modules share an order number, so `list` can serve as
/// a pre-flight check.
pub fn run(global: &GlobalOpts, log: &dyn Log) -> Result<()> {
    let root = resolve_modules_root(global);
    let registry = modules::registry();
    let discovered = modules::discover(&root, &registry, log);

    if discovered.is_empty() {
        log.info(&format!("no modules found under {}", root.display()));
        return Ok(());
    }

    log.stage(&format!(
        "{} modules under {}",
        discovered.len(),
        root.display()
    ));
    for module in &discovered {
        let line = match &module.description {
            Some(desc) => format!("[{}] {}: {desc}", module.order, module.name),
            None => format!("[{}] {}", module.order, module.name),
        };
        log.info(&line);
    }

    modules::validate_unique_orders(&discovered)?;
    Ok(())
}
