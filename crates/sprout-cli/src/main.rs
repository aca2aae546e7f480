//! # sprout-cli
//!
//! Dependency resolution and fetching for bower and pub projects.
//!
//! This is the main entry point for the Sprout CLI tool. It handles command parsing,
//! sets up logging and error handling, and dispatches to the appropriate command handlers.

use std::collections::HashMap;
use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use sprout_core::error::{SproutError, SproutResult};
use sprout_manager::Ecosystem;
use tracing::{error, info};

mod commands;
mod output;

use commands::CommandContext;
use output::errors::ErrorFormatter;

/// Resolve and fetch the dependencies of bower and pub projects
#[derive(Parser, Debug)]
#[command(name = "sprout", version, about = "Dependency resolution and fetch engine")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Package ecosystem; detected from the manifest when omitted
    #[arg(long, global = true, value_parser = parse_ecosystem)]
    pub ecosystem: Option<Ecosystem>,

    /// Fetch strategy (zip or clone)
    #[arg(long, global = true)]
    pub strategy: Option<String>,

    /// Dependencies to ignore, comma separated
    #[arg(long, global = true, value_delimiter = ',')]
    pub ignore: Vec<String>,

    /// Fetch complex versions from the latest stable branch
    #[arg(long, global = true)]
    pub map_complex_versions: bool,

    /// Maximum number of concurrent fetches
    #[arg(short, long, global = true)]
    pub jobs: Option<usize>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch packages that are not installed yet
    Install {
        /// Fail when no declared dependency can be resolved
        #[arg(long)]
        require_resolved: bool,
    },
    /// Re-fetch every package
    Upgrade {
        /// Fail when no declared dependency can be resolved
        #[arg(long)]
        require_resolved: bool,
    },
    /// Check that every declared dependency is installed
    Check,
    /// Print the file a package reference points to
    Resolve { reference: String },
    /// Print the package reference of a file
    Reference { file: Utf8PathBuf },
    /// Show how each dependency resolves without fetching
    Discover,
}

impl Cli {
    /// Settings overrides given on the command line
    pub fn overrides(&self) -> HashMap<String, String> {
        let mut overrides = HashMap::new();
        if let Some(strategy) = &self.strategy {
            overrides.insert("fetch-strategy".to_string(), strategy.clone());
        }
        if !self.ignore.is_empty() {
            overrides.insert("ignore".to_string(), self.ignore.join(","));
        }
        if self.map_complex_versions {
            overrides.insert("map-complex-versions".to_string(), "true".to_string());
        }
        if let Some(jobs) = self.jobs {
            overrides.insert("max-concurrent-fetches".to_string(), jobs.to_string());
        }
        overrides
    }
}

fn parse_ecosystem(value: &str) -> Result<Ecosystem, String> {
    value.parse::<Ecosystem>().map_err(|e| e.to_string())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.verbose);
    setup_panic_handler();

    info!("Starting Sprout CLI v{}", env!("CARGO_PKG_VERSION"));

    match run_cli(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{}", ErrorFormatter::new().format_error(&e));
            ExitCode::FAILURE
        },
    }
}

fn run_cli(cli: Cli) -> SproutResult<bool> {
    // Create Tokio runtime for async operations
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| SproutError::io("Failed to create async runtime".to_string(), e))?;

    rt.block_on(async {
        let ctx = CommandContext::new(cli.ecosystem, &cli.overrides()).await?;
        commands::dispatch_command(cli.command, &ctx).await
    })
}

fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = [
        "sprout",
        "sprout_config",
        "sprout_registry",
        "sprout_resolver",
        "sprout_fetch",
        "sprout_manager",
    ]
    .iter()
    .map(|target| format!("{}={}", target, level))
    .collect::<Vec<_>>()
    .join(",");

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|panic_info| {
        error!("Sprout encountered an unexpected error: {}", panic_info);
        eprintln!("🌱 Sprout crashed! This is a bug.");
        eprintln!("Please report this at: https://github.com/sprout-pm/sprout/issues");
        eprintln!("Error: {}", panic_info);
    }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_become_overrides() {
        let cli = Cli::try_parse_from([
            "sprout",
            "install",
            "--strategy",
            "clone",
            "--ignore",
            "core-tests,web-animations",
            "--map-complex-versions",
            "-j",
            "4",
        ])
        .unwrap();

        let overrides = cli.overrides();
        assert_eq!(overrides["fetch-strategy"], "clone");
        assert_eq!(overrides["ignore"], "core-tests,web-animations");
        assert_eq!(overrides["map-complex-versions"], "true");
        assert_eq!(overrides["max-concurrent-fetches"], "4");
        assert!(matches!(cli.command, Commands::Install { require_resolved: false }));
    }

    #[test]
    fn test_ecosystem_flag() {
        let cli = Cli::try_parse_from(["sprout", "check", "--ecosystem", "pub"]).unwrap();
        assert_eq!(cli.ecosystem, Some(Ecosystem::Pub));
        assert!(cli.overrides().is_empty());

        assert!(Cli::try_parse_from(["sprout", "check", "--ecosystem", "npm"]).is_err());
    }
}
