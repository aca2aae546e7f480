//! Command implementations and dispatch logic.
//!
//! Each command is an async function taking the shared [`CommandContext`]
//! and returning whether it succeeded.

use std::collections::HashMap;

use camino::Utf8PathBuf;
use sprout_config::{ConfigLoader, Settings};
use sprout_core::error::{SproutError, SproutResult};
use sprout_core::types::FetchMode;
use sprout_manager::{create_manager, BowerManager, Ecosystem, InstallOptions, PackageManager};
use tracing::info;

pub mod check;
pub mod discover;
pub mod install;
pub mod reference;


use crate::output::OutputHandler;
use crate::Commands;

/// Shared context for all commands
pub struct CommandContext {
    pub cwd: Utf8PathBuf,
    pub output: OutputHandler,
    pub settings: Settings,
    /// Ecosystem given on the command line
    pub ecosystem: Option<Ecosystem>,
}

impl CommandContext {
    /// Create a context for the current directory, loading layered settings
    pub async fn new(
        ecosystem: Option<Ecosystem>,
        overrides: &HashMap<String, String>,
    ) -> SproutResult<Self> {
        let cwd = std::env::current_dir()
            .map_err(|e| SproutError::io("Failed to get current directory".to_string(), e))?;
        let cwd = Utf8PathBuf::from_path_buf(cwd).map_err(|path| SproutError::ConfigValidation {
            field: "cwd".to_string(),
            reason: format!("{} is not valid UTF-8", path.display()),
        })?;

        let (settings, _sources) = ConfigLoader::new(cwd.clone()).load_settings(overrides).await?;

        Ok(Self {
            cwd,
            output: OutputHandler::new(),
            settings,
            ecosystem,
        })
    }

    /// Ecosystem from the command line, else the one whose manifest is present
    pub fn ecosystem(&self) -> SproutResult<Ecosystem> {
        if let Some(ecosystem) = self.ecosystem {
            return Ok(ecosystem);
        }
        Ecosystem::detect(&self.cwd).ok_or_else(|| SproutError::PreconditionViolation {
            message: format!("no bower.json or pubspec.yaml in {}", self.cwd),
        })
    }

    /// Back-end for this project
    pub fn manager(&self, options: InstallOptions) -> SproutResult<Box<dyn PackageManager>> {
        match self.ecosystem()? {
            Ecosystem::Bower => Ok(Box::new(
                BowerManager::from_settings(&self.settings)?.with_options(options),
            )),
            ecosystem => create_manager(ecosystem, &self.settings),
        }
    }
}

/// Dispatch a command to its handler
pub async fn dispatch_command(command: Commands, ctx: &CommandContext) -> SproutResult<bool> {
    match command {
        Commands::Install { require_resolved } => {
            info!("Installing dependencies (require_resolved: {})", require_resolved);
            install::execute(FetchMode::Install, require_resolved, ctx).await
        },
        Commands::Upgrade { require_resolved } => {
            info!("Upgrading dependencies (require_resolved: {})", require_resolved);
            install::execute(FetchMode::Upgrade, require_resolved, ctx).await
        },
        Commands::Check => {
            info!("Checking installed dependencies");
            check::execute(ctx).await
        },
        Commands::Resolve { reference } => {
            info!("Resolving reference: {}", reference);
            reference::resolve(&reference, ctx)
        },
        Commands::Reference { file } => {
            info!("Computing reference for: {}", file);
            reference::reference_for(&file, ctx)
        },
        Commands::Discover => {
            info!("Discovering dependencies");
            discover::execute(ctx).await
        },
    }
}
