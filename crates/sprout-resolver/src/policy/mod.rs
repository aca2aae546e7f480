//! Reference resolution policy
//!
//! Maps one declaration plus [`ResolutionSettings`] to a [`Package`]. The
//! rules are applied in a fixed order:
//!
//! 1. ignored names stop everything
//! 2. `"*"` must be mapped through the override table
//! 3. otherwise an override replaces the declared expression
//! 4. the (possibly substituted) expression must match `path(#token)?`
//! 5. a missing token means the stable branch
//! 6. a token that is not simple is a complex version: mapped to the stable
//!    branch when allowed, unresolved otherwise
//! 7. anything left resolves as declared

use once_cell::sync::Lazy;
use regex::Regex;
use sprout_config::ResolutionSettings;
use sprout_core::types::{
    DependencyDeclaration, IgnoredReason, Package, ResolutionOutcome, ResolvedReason,
    UnresolvedReason, STABLE_BRANCH,
};

static LOCATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([-\w./]+)(?:#(.*))?$").expect("location pattern is valid"));

static SIMPLE_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-\w.]+$").expect("token pattern is valid"));

/// Whether a branch/version token is a plain branch or tag name
pub fn is_simple_token(token: &str) -> bool {
    SIMPLE_TOKEN.is_match(token)
}

/// Apply the policy to one declaration
pub fn resolve(declaration: &DependencyDeclaration, settings: &ResolutionSettings) -> Package {
    let (resolution, path, branch) = evaluate(declaration, settings);

    Package {
        name: declaration.name.clone(),
        path,
        branch,
        declared: declaration.location_expr.clone(),
        kind: declaration.kind,
        resolution,
    }
}

fn evaluate(
    declaration: &DependencyDeclaration,
    settings: &ResolutionSettings,
) -> (ResolutionOutcome, String, String) {
    let name = declaration.name.as_str();
    let declared = declaration.location_expr.as_str();

    if settings.ignored_dependencies.contains(name) {
        return (
            ResolutionOutcome::Ignored(IgnoredReason::PerConfigDirective),
            String::new(),
            String::new(),
        );
    }

    let mut reason = None;
    let overridden = settings.overridden_dependencies.get(name);

    let expr = if declaration.is_star() {
        match overridden {
            Some(mapped) => {
                reason = Some(ResolvedReason::StarPathMapped);
                mapped.as_str()
            },
            None => return unresolved(UnresolvedReason::StarPathUnmapped, ""),
        }
    } else if let Some(mapped) = overridden {
        reason = Some(ResolvedReason::PathOverridden);
        mapped.as_str()
    } else {
        declared
    };

    let Some(captures) = LOCATION.captures(expr) else {
        return unresolved(UnresolvedReason::MalformedSpec, "");
    };
    let path = captures[1].to_string();
    let token = captures.get(2).map(|m| m.as_str()).filter(|t| !t.is_empty());

    let branch = match token {
        None => STABLE_BRANCH.to_string(),
        Some(token) if is_simple_token(token) => token.to_string(),
        Some(_) if settings.map_complex_version_to_latest_stable => {
            reason = Some(ResolvedReason::ComplexVersionDefaulted);
            STABLE_BRANCH.to_string()
        },
        Some(_) => return unresolved(UnresolvedReason::ComplexVersionUnsupported, &path),
    };

    (
        ResolutionOutcome::Resolved(reason.unwrap_or(ResolvedReason::UsedAsIs)),
        path,
        branch,
    )
}

fn unresolved(reason: UnresolvedReason, path: &str) -> (ResolutionOutcome, String, String) {
    (
        ResolutionOutcome::Unresolved(reason),
        path.to_string(),
        String::new(),
    )
}
