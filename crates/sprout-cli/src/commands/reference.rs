//! `sprout resolve` and `sprout reference`.

use std::sync::Arc;

use camino::Utf8Path;
use sprout_core::error::SproutResult;
use sprout_manager::{Project, ReferenceResolver};

use super::CommandContext;

/// Path lookups only need the layout; no back-end is built
fn resolver(ctx: &CommandContext) -> SproutResult<ReferenceResolver> {
    let layout = *ctx.ecosystem()?.layout();
    Ok(ReferenceResolver::new(Arc::new(Project::new(ctx.cwd.clone())), layout))
}

/// Print the file `reference` points to
pub fn resolve(reference: &str, ctx: &CommandContext) -> SproutResult<bool> {
    match resolver(ctx)?.resolve_to_location(reference) {
        Some(path) => {
            ctx.output.info(path.as_str());
            Ok(true)
        },
        None => {
            ctx.output.error(&format!("'{}' does not point to an existing file", reference));
            Ok(false)
        },
    }
}

/// Print the reference of `file`
pub fn reference_for(file: &Utf8Path, ctx: &CommandContext) -> SproutResult<bool> {
    let file = if file.is_absolute() {
        file.to_path_buf()
    } else {
        ctx.cwd.join(file)
    };

    match resolver(ctx)?.reference_for(&file) {
        Some(reference) => {
            ctx.output.info(&reference);
            Ok(true)
        },
        None => {
            ctx.output.error(&format!("{} is not inside a package or the source directory", file));
            Ok(false)
        },
    }
}
