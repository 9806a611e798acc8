//! Host platform checks.
//!
//! This tool only ever mutates Arch Linux systems; everything here exists
//! so the `run` command can refuse early instead of half-applying
//! configuration to the wrong distribution.

/// Information about the current host.
#[derive(Debug, Clone, Copy)]
pub struct Platform {
    /// Whether the host is Linux at all.
    pub is_linux: bool,
    /// Whether `/etc/arch-release` exists.
    pub is_arch: bool,
}

impl Platform {
    /// Detect the current platform.
    #[must_use]
    pub fn detect() -> Self {
        let is_linux = cfg!(target_os = "linux");
        Self {
            is_linux,
            is_arch: is_linux && std::path::Path::new("/etc/arch-release").exists(),
        }
    }

    /// Create a platform with explicit values (for testing).
    #[cfg(test)]
    #[must_use]
    pub const fn new(is_linux: bool, is_arch: bool) -> Self {
        Self { is_linux, is_arch }
    }
}
