//! `sprout check`: are all declared dependencies installed?

use sprout_core::error::SproutResult;
use sprout_manager::{InstallOptions, InstallState};

use super::CommandContext;

pub async fn execute(ctx: &CommandContext) -> SproutResult<bool> {
    let manager = ctx.manager(InstallOptions::default())?;

    match manager.are_packages_installed(&ctx.cwd).await? {
        InstallState::Installed => {
            ctx.output.success("All dependencies are installed");
            Ok(true)
        },
        InstallState::Missing(name) => {
            ctx.output.warn(&format!(
                "Dependency '{}' is not installed in {}",
                name,
                manager.layout().packages_dir
            ));
            ctx.output.info("Run 'sprout install' to fetch it.");
            Ok(false)
        },
    }
}
