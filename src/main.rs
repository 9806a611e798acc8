//! Binary entry point for the `archup` provisioning CLI.
#![allow(clippy::print_stdout)]

use std::sync::Arc;

use anyhow::Result;
use clap::{CommandFactory, Parser};

use archup_cli::cli::{Cli, Command};
use archup_cli::commands;
use archup_cli::logging::Logger;
use archup_cli::sudo;

fn main() -> Result<()> {
    let args = Cli::parse();
    let log = Arc::new(Logger::new(args.verbose));

    match args.command {
        Command::Run(ref opts) => {
            // A Ctrl-C mid-run must not leave a live sudo grant behind.
            sudo::register_interrupt_revoke();
            commands::run::run(&args.global, opts, &log)
        }
        Command::List => commands::list::run(&args.global, log.as_ref()),
        Command::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "archup", &mut std::io::stdout());
            Ok(())
        }
        Command::Version => {
            let version = option_env!("ARCHUP_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
            println!("archup {version}");
            Ok(())
        }
    }
}
