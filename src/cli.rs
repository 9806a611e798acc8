use clap::{Parser, Subcommand};

/// Top-level CLI entry point for the provisioning engine.
#[derive(Parser, Debug)]
#[command(
    name = "archup",
    about = "Arch Linux desktop provisioning engine",
    version
)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Options shared across all subcommands.
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone)]
pub struct GlobalOpts {
    /// Override the modules root directory
    #[arg(long, global = true)]
    pub modules_root: Option<std::path::PathBuf>,

    /// Validate and print the execution plan without running anything
    #[arg(short = 'd', long, global = true)]
    pub dry_run: bool,

    /// Interval in seconds between sudo keep-alive refreshes (minimum 10)
    #[arg(long, global = true, default_value_t = 60)]
    pub keepalive_secs: u64,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run all provisioning modules in order
    Run(RunOpts),
    /// Discover modules and report ordering problems without executing
    List,
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
    /// Print version information
    Version,
}

/// Options for the `run` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct RunOpts {
    /// Skip modules whose name contains any of these strings
    #[arg(long, value_delimiter = ',')]
    pub skip: Vec<String>,

    /// Run only modules whose name contains any of these strings
    #[arg(long, value_delimiter = ',')]
    pub only: Vec<String>,
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_run() {
        let cli = Cli::parse_from(["archup", "run"]);
        assert!(matches!(cli.command, Command::Run(_)));
    }

    #[test]
    fn parse_run_dry_run() {
        let cli = Cli::parse_from(["archup", "--dry-run", "run"]);
        assert!(cli.global.dry_run);
    }

    #[test]
    fn parse_run_dry_run_short() {
        let cli = Cli::parse_from(["archup", "-d", "run"]);
        assert!(cli.global.dry_run);
    }

    #[test]
    fn parse_run_skip_modules() {
        let cli = Cli::parse_from(["archup", "run", "--skip", "gpu,theming"]);
        assert!(
            matches!(&cli.command, Command::Run(_)),
            "Expected Run command"
        );
        if let Command::Run(opts) = cli.command {
            assert_eq!(opts.skip, vec!["gpu", "theming"]);
        }
    }

    #[test]
    fn parse_run_only_modules() {
        let cli = Cli::parse_from(["archup", "run", "--only", "power"]);
        assert!(
            matches!(&cli.command, Command::Run(_)),
            "Expected Run command"
        );
        if let Command::Run(opts) = cli.command {
            assert_eq!(opts.only, vec!["power"]);
        }
    }

    #[test]
    fn parse_modules_root_override() {
        let cli = Cli::parse_from(["archup", "--modules-root", "/tmp/modules", "list"]);
        assert_eq!(
            cli.global.modules_root,
            Some(std::path::PathBuf::from("/tmp/modules"))
        );
    }

    #[test]
    fn parse_keepalive_default() {
        let cli = Cli::parse_from(["archup", "run"]);
        assert_eq!(cli.global.keepalive_secs, 60);
    }

    #[test]
    fn parse_keepalive_override() {
        let cli = Cli::parse_from(["archup", "--keepalive-secs", "30", "run"]);
        assert_eq!(cli.global.keepalive_secs, 30);
    }

    #[test]
    fn parse_verbose() {
        let cli = Cli::parse_from(["archup", "-v", "run"]);
        assert!(cli.verbose);
    }

    #[test]
    fn parse_list() {
        let cli = Cli::parse_from(["archup", "list"]);
        assert!(matches!(cli.command, Command::List));
    }

    #[test]
    fn parse_version() {
        let cli = Cli::parse_from(["archup", "version"]);
        assert!(matches!(cli.command, Command::Version));
    }
}
