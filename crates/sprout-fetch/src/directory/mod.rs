//! Package directory preparation
//!
//! | existed | mode    | action                              |
//! |---------|---------|-------------------------------------|
//! | no      | any     | create, then fetch                  |
//! | yes     | Install | leave as is, no fetch               |
//! | yes     | Upgrade | remove, recreate, then fetch        |

use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use sprout_core::error::SproutError;
use sprout_core::types::FetchMode;
use tracing::debug;

use crate::FetchResult;

/// Outcome of preparing one package directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDirectoryState {
    pub path: Utf8PathBuf,
    /// Whether the directory was there before preparation
    pub existed: bool,
}

impl PackageDirectoryState {
    /// Whether contents must be fetched into the directory
    pub fn needs_fetch(&self, mode: FetchMode) -> bool {
        !self.existed || mode == FetchMode::Upgrade
    }
}

/// Prepare `path` for `mode`
pub async fn prepare_package_dir(path: &Utf8Path, mode: FetchMode) -> FetchResult<PackageDirectoryState> {
    let existed = match tokio::fs::metadata(path).await {
        Ok(metadata) if metadata.is_dir() => true,
        Ok(_) => {
            return Err(SproutError::DirectoryCreationFailure {
                path: path.to_string(),
                source: io::Error::new(io::ErrorKind::AlreadyExists, "a file is in the way"),
            });
        },
        Err(e) if e.kind() == io::ErrorKind::NotFound => false,
        // e.g. a parent component is a regular file
        Err(source) => {
            return Err(SproutError::DirectoryCreationFailure {
                path: path.to_string(),
                source,
            });
        },
    };

    match (existed, mode) {
        (true, FetchMode::Install) => {
            debug!("{} exists, keeping it", path);
        },
        (true, FetchMode::Upgrade) => {
            debug!("{} exists, removing it for upgrade", path);
            tokio::fs::remove_dir_all(path)
                .await
                .map_err(|e| SproutError::io(format!("Failed to remove {}", path), e))?;
            create_dir(path).await?;
        },
        (false, _) => {
            create_dir(path).await?;
        },
    }

    Ok(PackageDirectoryState {
        path: path.to_path_buf(),
        existed,
    })
}

async fn create_dir(path: &Utf8Path) -> FetchResult<()> {
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|source| SproutError::DirectoryCreationFailure {
            path: path.to_string(),
            source,
        })
}
