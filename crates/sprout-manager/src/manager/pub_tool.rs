//! Back-end that delegates to the external `pub` tool

use async_trait::async_trait;
use camino::Utf8Path;
use sprout_config::Settings;
use sprout_core::error::SproutError;
use sprout_core::types::FetchMode;
use sprout_fetch::{ProgressFormat, ProgressMonitor};
use tokio::process::Command;
use tracing::{debug, info, warn};

use super::{require_manifest, InstallSummary, PackageManager};
use crate::layout::{PackageLayout, PUB_LAYOUT};
use crate::ManagerResult;

/// Runs `pub get` / `pub upgrade` in the project root
#[derive(Debug, Clone)]
pub struct PubManager {
    layout: PackageLayout,
    executable: String,
}

impl PubManager {
    pub fn new(executable: impl Into<String>) -> Self {
        Self {
            layout: PUB_LAYOUT,
            executable: executable.into(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.pub_executable.clone())
    }

    async fn run(
        &self,
        root: &Utf8Path,
        subcommand: &str,
        mode: FetchMode,
        progress: &dyn ProgressMonitor,
    ) -> ManagerResult<InstallSummary> {
        require_manifest(&self.layout, root)?;
        let command = format!("{} {}", self.executable, subcommand);

        // known upstream defect in `pub` on Windows
        if cfg!(windows) {
            warn!("Skipping `{}` in {}: not supported on Windows", command, root);
            return Ok(InstallSummary::empty(mode));
        }

        progress.start(&format!("Running {}", command), 1, ProgressFormat::Indeterminate);
        debug!("Running `{}` in {}", command, root);

        let output = Command::new(&self.executable)
            .arg(subcommand)
            .current_dir(root)
            .output()
            .await;

        progress.worked(1);
        progress.done();

        let output = output.map_err(|e| SproutError::ExternalTool {
            command: command.clone(),
            status: "failed to start".to_string(),
            stderr: e.to_string(),
        })?;

        if !output.status.success() {
            return Err(SproutError::ExternalTool {
                command,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        info!("`{}` finished in {}", command, root);
        Ok(InstallSummary::empty(mode))
    }
}

#[async_trait]
impl PackageManager for PubManager {
    fn layout(&self) -> &PackageLayout {
        &self.layout
    }

    async fn install_packages(
        &self,
        root: &Utf8Path,
        progress: &dyn ProgressMonitor,
    ) -> ManagerResult<InstallSummary> {
        self.run(root, "get", FetchMode::Install, progress).await
    }

    async fn upgrade_packages(
        &self,
        root: &Utf8Path,
        progress: &dyn ProgressMonitor,
    ) -> ManagerResult<InstallSummary> {
        self.run(root, "upgrade", FetchMode::Upgrade, progress).await
    }
}
