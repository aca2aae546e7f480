//! On-disk layout of a project
//!
//! Each ecosystem fixes the manifest file name, the packages directory (one
//! subdirectory per dependency, named after it) and optionally a source
//! directory used for self references.

use std::fmt;
use std::str::FromStr;

use camino::{Utf8Path, Utf8PathBuf};
use sprout_config::{parse_manifest, Manifest, ManifestFormat};
use sprout_core::error::SproutError;

use crate::ManagerResult;

/// Supported package ecosystems
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ecosystem {
    Pub,
    Bower,
}

/// Fixed directory convention of one ecosystem
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackageLayout {
    pub ecosystem: Ecosystem,
    pub manifest_file: &'static str,
    pub packages_dir: &'static str,
    pub source_dir: Option<&'static str>,
    pub reference_prefix: &'static str,
}

pub const PUB_LAYOUT: PackageLayout = PackageLayout {
    ecosystem: Ecosystem::Pub,
    manifest_file: "pubspec.yaml",
    packages_dir: "packages",
    source_dir: Some("lib"),
    reference_prefix: "package:",
};

pub const BOWER_LAYOUT: PackageLayout = PackageLayout {
    ecosystem: Ecosystem::Bower,
    manifest_file: "bower.json",
    packages_dir: "bower_components",
    source_dir: None,
    reference_prefix: "bower:",
};

impl Ecosystem {
    pub fn layout(self) -> &'static PackageLayout {
        match self {
            Ecosystem::Pub => &PUB_LAYOUT,
            Ecosystem::Bower => &BOWER_LAYOUT,
        }
    }

    /// Ecosystem whose manifest sits directly under `root`, pub first
    pub fn detect(root: &Utf8Path) -> Option<Self> {
        [Ecosystem::Pub, Ecosystem::Bower]
            .into_iter()
            .find(|e| e.layout().manifest_path(root).is_file())
    }
}

impl PackageLayout {
    pub fn manifest_path(&self, root: &Utf8Path) -> Utf8PathBuf {
        root.join(self.manifest_file)
    }

    pub fn packages_path(&self, root: &Utf8Path) -> Utf8PathBuf {
        root.join(self.packages_dir)
    }

    pub fn source_path(&self, root: &Utf8Path) -> Option<Utf8PathBuf> {
        self.source_dir.map(|dir| root.join(dir))
    }

    /// Synchronously read the project manifest; `Ok(None)` when there is none
    pub fn read_manifest(&self, root: &Utf8Path) -> ManagerResult<Option<Manifest>> {
        let path = self.manifest_path(root);
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(SproutError::io(format!("Failed to read {}", path), e)),
        };
        let format = ManifestFormat::from_file_name(self.manifest_file);
        parse_manifest(&text, format, path.as_str()).map(Some)
    }
}

impl FromStr for Ecosystem {
    type Err = SproutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pub" => Ok(Ecosystem::Pub),
            "bower" => Ok(Ecosystem::Bower),
            other => Err(SproutError::ConfigValidation {
                field: "ecosystem".to_string(),
                reason: format!("expected 'pub' or 'bower', got '{}'", other),
            }),
        }
    }
}

impl fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ecosystem::Pub => f.write_str("pub"),
            Ecosystem::Bower => f.write_str("bower"),
        }
    }
}
