//! `sprout discover`: print how every dependency resolves, without fetching.

use sprout_core::error::{SproutError, SproutResult};
use sprout_core::types::Package;
use sprout_manager::{BowerManager, Ecosystem};

use super::CommandContext;

pub async fn execute(ctx: &CommandContext) -> SproutResult<bool> {
    let ecosystem = ctx.ecosystem()?;
    if ecosystem != Ecosystem::Bower {
        return Err(SproutError::ConfigValidation {
            field: "ecosystem".to_string(),
            reason: format!("discover is only available for bower projects, not {}", ecosystem),
        });
    }

    let discovery = BowerManager::from_settings(&ctx.settings)?.discover(&ctx.cwd).await?;

    if discovery.packages.is_empty() {
        ctx.output.info("No dependencies declared");
        return Ok(true);
    }

    for package in discovery.packages.values() {
        ctx.output.info(&describe(package));
    }
    ctx.output.success(&format!(
        "{} of {} dependencies resolved",
        discovery.resolved_count(),
        discovery.packages.len()
    ));
    Ok(true)
}

/// One table row: name, declared expression, fetch location and outcome
pub fn describe(package: &Package) -> String {
    let location = if package.is_resolved() {
        package.spec()
    } else {
        "-".to_string()
    };
    format!(
        "{:<24} {:<32} {:<40} {}",
        package.name, package.declared, location, package.resolution
    )
}
