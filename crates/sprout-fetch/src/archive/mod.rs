//! Branch archive inflation
//!
//! Archives served by hosting platforms wrap everything in a single
//! `<repo>-<branch>/` directory. Inflation drops that first component and
//! replays the remaining entries in listed order: zero-length entries ending
//! in `/` create directories, everything else is written as a file. A file
//! is only written when its parent directory already exists.

use std::fs;
use std::io::{self, Cursor};

use camino::Utf8Path;
use sprout_core::error::SproutError;
use sprout_core::utils::{safe_join, strip_wrapper};
use tracing::debug;
use zip::ZipArchive;

use crate::FetchResult;

/// What an inflation wrote
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InflateStats {
    pub directories: usize,
    pub files: usize,
}

/// Inflate a zip archive into `dest`, which must already exist
pub fn inflate_archive(bytes: &[u8], dest: &Utf8Path) -> FetchResult<InflateStats> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(|e| SproutError::ArchiveWriteFailure {
        entry: dest.to_string(),
        message: format!("invalid archive: {}", e),
    })?;

    let mut stats = InflateStats::default();

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).map_err(|e| SproutError::ArchiveWriteFailure {
            entry: format!("#{}", index),
            message: e.to_string(),
        })?;

        let name = entry.name().to_string();
        let Some(relative) = strip_wrapper(&name) else {
            continue;
        };
        let target = safe_join(dest, Utf8Path::new(relative))?;

        if entry.size() == 0 && name.ends_with('/') {
            fs::create_dir_all(&target).map_err(|source| SproutError::DirectoryCreationFailure {
                path: target.to_string(),
                source,
            })?;
            stats.directories += 1;
            continue;
        }

        write_entry(&mut entry, &name, &target)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                if let Err(e) = fs::set_permissions(&target, fs::Permissions::from_mode(mode)) {
                    debug!("Could not set mode {:o} on {}: {}", mode, target, e);
                }
            }
        }

        stats.files += 1;
    }

    debug!(
        "Inflated {} directories and {} files into {}",
        stats.directories, stats.files, dest
    );
    Ok(stats)
}

fn write_entry<R: io::Read>(reader: &mut R, name: &str, target: &Utf8Path) -> FetchResult<()> {
    let parent_exists = target.parent().map(|p| p.is_dir()).unwrap_or(false);
    if !parent_exists {
        return Err(SproutError::ArchiveWriteFailure {
            entry: name.to_string(),
            message: "parent directory does not exist".to_string(),
        });
    }

    let mut file = fs::File::create(target).map_err(|e| SproutError::ArchiveWriteFailure {
        entry: name.to_string(),
        message: e.to_string(),
    })?;
    io::copy(reader, &mut file).map_err(|e| SproutError::ArchiveWriteFailure {
        entry: name.to_string(),
        message: e.to_string(),
    })?;
    Ok(())
}

#[cfg(test)]
mod tests;
