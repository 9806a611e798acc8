//! CLI command handlers.

pub mod list;
pub mod run;

use std::path::PathBuf;

use anyhow::{Result, bail};

use crate::cli::GlobalOpts;
use crate::platform::Platform;

/// Environment variable overriding the modules root.
pub const MODULES_ROOT_ENV: &str = "ARCHUP_MODULES";

/// Resolve the modules root directory.
///
/// Resolution order: the `--modules-root` flag, the `ARCHUP_MODULES`
/// environment variable, a `modules/` directory next to the executable,
/// then `modules/` in the current directory.
#[must_use]
pub fn resolve_modules_root(global: &GlobalOpts) -> PathBuf {
    if let Some(ref root) = global.modules_root {
        return root.clone();
    }
    if let Ok(env_root) = std::env::var(MODULES_ROOT_ENV)
        && !env_root.is_empty()
    {
        return PathBuf::from(env_root);
    }
    if let Ok(exe) = std::env::current_exe()
        && let Some(dir) = exe.parent()
    {
        let candidate = dir.join("modules");
        if candidate.is_dir() {
            return candidate;
        }
    }
    PathBuf::from("modules")
}

/// Refuse to provision anything that is not an Arch Linux host.
///
/// # Errors
///
/// Returns an error when the host is not Arch Linux.
pub fn ensure_supported_platform(platform: &Platform) -> Result<()> {
    if !platform.is_arch {
        bail!("this tool only provisions Arch Linux hosts (missing /etc/arch-release)");
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn opts(root: Option<&str>) -> GlobalOpts {
        GlobalOpts {
            modules_root: root.map(PathBuf::from),
            dry_run: false,
            keepalive_secs: 60,
        }
    }

    #[test]
    fn flag_wins_over_everything() {
        let root = resolve_modules_root(&opts(Some("/opt/archup/modules")));
        assert_eq!(root, PathBuf::from("/opt/archup/modules"));
    }

    #[test]
    fn default_is_relative_modules_dir() {
        // No flag; the env var and exe-relative candidates are absent in
        // the test environment unless explicitly set.
        if std::env::var(MODULES_ROOT_ENV).is_err() {
            let root = resolve_modules_root(&opts(None));
            assert!(root.ends_with("modules"));
        }
    }

    #[test]
    fn non_arch_platform_is_rejected() {
        let platform = Platform::new(true, false);
        assert!(ensure_supported_platform(&platform).is_err());
    }

    #[test]
    fn arch_platform_is_accepted() {
        let platform = Platform::new(true, true);
        assert!(ensure_supported_platform(&platform).is_ok());
    }
}
