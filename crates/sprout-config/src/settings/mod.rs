//! sprout.toml settings parsing and the resolved settings model

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use camino::Utf8Path;
use serde::{Deserialize, Serialize};
use sprout_core::error::SproutError;

use crate::ConfigResult;

/// Default host for archive downloads and clones
pub const DEFAULT_ARCHIVE_BASE_URL: &str = "https://github.com";
/// Default host for raw manifest reads
pub const DEFAULT_RAW_BASE_URL: &str = "https://raw.githubusercontent.com";
/// Default external tool for the pub ecosystem
pub const DEFAULT_PUB_EXECUTABLE: &str = "pub";

/// sprout.toml as written on disk; every field is optional so layers can be merged
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SproutToml {
    /// Dependencies never fetched
    #[serde(default)]
    pub ignored_dependencies: BTreeSet<String>,

    /// Location expressions replacing declared ones, by name
    #[serde(default)]
    pub overridden_dependencies: BTreeMap<String, String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub map_complex_version_to_latest_stable: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetch_strategy: Option<FetchStrategy>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_concurrent_fetches: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pub_executable: Option<String>,

    #[serde(default)]
    pub source: SourceSection,
}

/// `[source]` table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SourceSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive_base_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_base_url: Option<String>,
}

/// How package contents are fetched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchStrategy {
    /// Structured clone of the branch
    Clone,
    /// Download and inflate the branch archive
    #[default]
    Zip,
}

/// Inputs of the resolution policy
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionSettings {
    pub ignored_dependencies: BTreeSet<String>,
    pub overridden_dependencies: BTreeMap<String, String>,
    pub map_complex_version_to_latest_stable: bool,
}

/// Where packages are fetched from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSettings {
    pub archive_base_url: String,
    pub raw_base_url: String,
}

/// Fully layered settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub resolution: ResolutionSettings,
    pub fetch_strategy: FetchStrategy,
    /// `None` keeps discovery and fetching unbounded
    pub max_concurrent_fetches: Option<usize>,
    pub source: SourceSettings,
    pub pub_executable: String,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            archive_base_url: DEFAULT_ARCHIVE_BASE_URL.to_string(),
            raw_base_url: DEFAULT_RAW_BASE_URL.to_string(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            resolution: ResolutionSettings::default(),
            fetch_strategy: FetchStrategy::default(),
            max_concurrent_fetches: None,
            source: SourceSettings::default(),
            pub_executable: DEFAULT_PUB_EXECUTABLE.to_string(),
        }
    }
}

impl Settings {
    /// Overlay one sprout.toml layer; sets are unioned, maps and scalars overwritten
    pub fn apply(&mut self, layer: &SproutToml) {
        self.resolution
            .ignored_dependencies
            .extend(layer.ignored_dependencies.iter().cloned());
        self.resolution.overridden_dependencies.extend(
            layer
                .overridden_dependencies
                .iter()
                .map(|(name, expr)| (name.clone(), expr.clone())),
        );
        if let Some(map) = layer.map_complex_version_to_latest_stable {
            self.resolution.map_complex_version_to_latest_stable = map;
        }
        if let Some(strategy) = layer.fetch_strategy {
            self.fetch_strategy = strategy;
        }
        if layer.max_concurrent_fetches.is_some() {
            self.max_concurrent_fetches = layer.max_concurrent_fetches;
        }
        if let Some(executable) = &layer.pub_executable {
            self.pub_executable = executable.clone();
        }
        if let Some(url) = &layer.source.archive_base_url {
            self.source.archive_base_url = url.clone();
        }
        if let Some(url) = &layer.source.raw_base_url {
            self.source.raw_base_url = url.clone();
        }
    }
}

impl FromStr for FetchStrategy {
    type Err = SproutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "clone" => Ok(FetchStrategy::Clone),
            "zip" => Ok(FetchStrategy::Zip),
            other => Err(SproutError::ConfigValidation {
                field: "fetch-strategy".to_string(),
                reason: format!("expected 'clone' or 'zip', got '{}'", other),
            }),
        }
    }
}

impl fmt::Display for FetchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchStrategy::Clone => f.write_str("clone"),
            FetchStrategy::Zip => f.write_str("zip"),
        }
    }
}

/// Parse sprout.toml text
pub fn parse_sprout_toml(content: &str, file: &str) -> ConfigResult<SproutToml> {
    let parsed: SproutToml = toml::from_str(content).map_err(|e| SproutError::ConfigParse {
        file: file.to_string(),
        message: e.to_string(),
    })?;

    if parsed.max_concurrent_fetches == Some(0) {
        return Err(SproutError::ConfigValidation {
            field: "max-concurrent-fetches".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    Ok(parsed)
}

/// Load sprout.toml from disk
pub async fn load_from_file(path: &Utf8Path) -> ConfigResult<SproutToml> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| SproutError::io(format!("Failed to read {}", path), e))?;
    parse_sprout_toml(&content, path.as_str())
}
