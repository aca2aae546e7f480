//! Path utilities for safe file system operations.
//!
//! Archive entry names and symbolic references are untrusted input; these
//! helpers keep them inside the directory they are meant for.

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};

use crate::error::{SproutError, SproutResult};

/// Check if a relative path stays inside its base directory
pub fn is_safe_path(path: &Utf8Path) -> bool {
    if path.is_absolute() {
        return false;
    }

    let mut depth = 0i32;

    for component in path.components() {
        match component {
            Utf8Component::CurDir => {},
            Utf8Component::ParentDir => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            },
            Utf8Component::Normal(_) => {
                depth += 1;
            },
            _ => {
                return false;
            },
        }
    }

    true
}

/// Safely join paths, preventing directory traversal
pub fn safe_join(base: &Utf8Path, path: &Utf8Path) -> SproutResult<Utf8PathBuf> {
    if !is_safe_path(path) {
        return Err(SproutError::ArchiveWriteFailure {
            entry: path.to_string(),
            message: "path escapes the destination directory".to_string(),
        });
    }

    let mut joined = base.to_path_buf();
    for component in path.components() {
        match component {
            Utf8Component::Normal(name) => joined.push(name),
            Utf8Component::ParentDir => {
                joined.pop();
            },
            _ => {},
        }
    }
    Ok(joined)
}

/// Drop the first `/`-separated component of an archive entry name.
///
/// Hosting platforms wrap archives in `<repo>-<branch>/`. Returns `None` for
/// the wrapper entry itself.
pub fn strip_wrapper(entry_name: &str) -> Option<&str> {
    let trimmed = entry_name.trim_start_matches('/');
    let (_, rest) = trimmed.split_once('/')?;
    if rest.is_empty() {
        None
    } else {
        Some(rest)
    }
}

/// Components of `path` below `root`, or `None` if it is not inside `root`.
///
/// `.` and `..` are folded lexically first, so `root/packages/a/../../lib/x`
/// is `lib/x`.
pub fn relative_to<'a>(root: &Utf8Path, path: &'a Utf8Path) -> Option<Vec<&'a str>> {
    let mut normalized: Vec<Utf8Component<'a>> = Vec::new();
    for component in path.components() {
        match component {
            Utf8Component::CurDir => {},
            Utf8Component::ParentDir => match normalized.last() {
                Some(Utf8Component::Normal(_)) => {
                    normalized.pop();
                },
                _ => return None,
            },
            other => normalized.push(other),
        }
    }

    let root: Vec<Utf8Component<'_>> = root
        .components()
        .filter(|c| !matches!(c, Utf8Component::CurDir))
        .collect();
    if normalized.len() < root.len() || normalized[..root.len()] != root[..] {
        return None;
    }

    normalized[root.len()..]
        .iter()
        .map(|c| match c {
            Utf8Component::Normal(name) => Some(*name),
            _ => None,
        })
        .collect()
}
