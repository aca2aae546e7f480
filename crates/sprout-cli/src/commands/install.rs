//! `sprout install` and `sprout upgrade`.

use std::time::Instant;

use sprout_core::error::SproutResult;
use sprout_core::types::FetchMode;
use sprout_manager::InstallOptions;

use super::CommandContext;

/// Install or upgrade the project's packages
pub async fn execute(mode: FetchMode, require_resolved: bool, ctx: &CommandContext) -> SproutResult<bool> {
    let start_time = Instant::now();
    let ecosystem = ctx.ecosystem()?;
    let manager = ctx.manager(InstallOptions { require_resolved })?;

    match mode {
        FetchMode::Install => ctx.output.step("🌱", &format!("Installing {} dependencies", ecosystem)),
        FetchMode::Upgrade => ctx.output.step("⬆️", &format!("Upgrading {} dependencies", ecosystem)),
    }

    let progress = ctx.output.progress();
    let run = async {
        match mode {
            FetchMode::Install => manager.install_packages(&ctx.cwd, &progress).await,
            FetchMode::Upgrade => manager.upgrade_packages(&ctx.cwd, &progress).await,
        }
    };
    tokio::pin!(run);

    // Ctrl-C cancels fetches; the batch still finishes and reports them as failed
    let summary = loop {
        tokio::select! {
            result = &mut run => break result?,
            Ok(()) = tokio::signal::ctrl_c() => {
                ctx.output.warn("Interrupted, cancelling fetches");
                manager.cancel();
            },
        }
    };

    if summary.discovered > 0 {
        ctx.output.info(&format!(
            "📊 {} dependencies discovered, {} resolved",
            summary.discovered, summary.resolved
        ));
    }
    for line in summary.comments.unresolved.iter() {
        ctx.output.warn(&format!("Unresolved {}", line));
    }
    for (name, reason) in &summary.report.failed {
        ctx.output.warn(&format!("Failed to fetch {}: {}", name, reason));
    }

    let report = &summary.report;
    let duration = start_time.elapsed();
    if summary.is_success() {
        ctx.output.success(&format!(
            "Done in {:.2}s ({} fetched, {} already present)",
            duration.as_secs_f64(),
            report.fetched.len(),
            report.skipped.len()
        ));
    } else {
        ctx.output.error(&format!(
            "{} of {} packages failed to fetch",
            report.failed.len(),
            report.total()
        ));
    }

    Ok(summary.is_success())
}
