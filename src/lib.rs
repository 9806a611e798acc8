//! Arch Linux desktop provisioning engine.
//!
//! Runs a sequence of numbered provisioning modules (power, network,
//! display server, audio, GPU, theming, backups, …) against a fresh Arch
//! install. Each module installs packages, writes system configuration,
//! and enables services through a single privileged sudo session that is
//! seeded once and kept alive in the background.
//!
//! The public API is organised into four layers:
//!
//! - **[`exec`]**: command invocation (capture, streaming, stdin payloads)
//! - **[`sudo`]**: the seeded, keep-alive sudo session
//! - **[`modules`]**: module registry, discovery, ordering, and the runner
//! - **[`commands`]**: top-level subcommand orchestration (`run`, `list`)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

/// Command-line argument definitions.
pub mod cli;
pub mod commands;
pub mod error;
pub mod exec;
pub mod logging;
pub mod modules;
pub mod pacman;
pub mod platform;
pub mod sudo;
