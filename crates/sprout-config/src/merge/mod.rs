//! Configuration layering, fallback logic, and environment overrides

use std::collections::HashMap;

use camino::Utf8PathBuf;
use sprout_core::error::SproutError;
use tracing::debug;

use crate::settings::{self, FetchStrategy, Settings, SproutToml};
use crate::ConfigResult;

/// Settings file looked up in the project and in `~/.sprout`
pub const SETTINGS_FILE: &str = "sprout.toml";

/// Main configuration loading interface
pub struct ConfigLoader {
    /// Current working directory
    cwd: Utf8PathBuf,
}

/// Configuration layering and merging
pub struct ConfigLayering;

/// Configuration source tracking
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    /// Global config file
    Global(Utf8PathBuf),
    /// Project sprout.toml file
    Project(Utf8PathBuf),
    /// Environment variable
    Environment(String),
    /// CLI flag
    CommandLine,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new(cwd: Utf8PathBuf) -> Self {
        Self { cwd }
    }

    /// Load every layer and merge them
    pub async fn load_settings(
        &self,
        cli_overrides: &HashMap<String, String>,
    ) -> ConfigResult<(Settings, Vec<ConfigSource>)> {
        let mut sources = Vec::new();

        let global = match self.load_global_config().await? {
            Some((config, path)) => {
                sources.push(ConfigSource::Global(path));
                Some(config)
            },
            None => None,
        };

        let project = match self.load_project_config().await? {
            Some((config, path)) => {
                sources.push(ConfigSource::Project(path));
                Some(config)
            },
            None => None,
        };

        let env_overrides = ConfigLayering::collect_env_overrides(std::env::vars());
        sources.extend(env_overrides.keys().cloned().map(ConfigSource::Environment));
        if !cli_overrides.is_empty() {
            sources.push(ConfigSource::CommandLine);
        }

        let settings = ConfigLayering::merge_configs(global, project, &env_overrides, cli_overrides)?;
        debug!("Loaded settings from {:?}", sources);
        Ok((settings, sources))
    }

    /// Load the project sprout.toml, if any
    pub async fn load_project_config(&self) -> ConfigResult<Option<(SproutToml, Utf8PathBuf)>> {
        let path = self.resolve_config_path(SETTINGS_FILE);
        if !path.exists() {
            return Ok(None);
        }
        let config = settings::load_from_file(&path).await?;
        Ok(Some((config, path)))
    }

    /// Find configuration file in project (walks up directory tree)
    pub fn resolve_config_path(&self, filename: &str) -> Utf8PathBuf {
        let mut current = self.cwd.as_path();

        loop {
            let config_path = current.join(filename);
            if config_path.exists() {
                return config_path;
            }

            match current.parent() {
                Some(parent) => current = parent,
                None => break,
            }
        }

        // Return path in current directory even if it doesn't exist
        self.cwd.join(filename)
    }

    /// Load global configuration
    pub async fn load_global_config(&self) -> ConfigResult<Option<(SproutToml, Utf8PathBuf)>> {
        let Some(home_dir) = dirs::home_dir() else {
            return Ok(None);
        };

        let global_config_path = Utf8PathBuf::try_from(home_dir)
            .map_err(|e| SproutError::ConfigValidation {
                field: "home_dir".to_string(),
                reason: format!("Invalid home directory path: {}", e),
            })?
            .join(".sprout")
            .join("config.toml");

        if global_config_path.exists() {
            let config = settings::load_from_file(&global_config_path).await?;
            Ok(Some((config, global_config_path)))
        } else {
            Ok(None)
        }
    }
}

impl ConfigLayering {
    /// Merge multiple configuration layers
    pub fn merge_configs(
        global_config: Option<SproutToml>,
        project_config: Option<SproutToml>,
        env_overrides: &HashMap<String, String>,
        cli_overrides: &HashMap<String, String>,
    ) -> ConfigResult<Settings> {
        let mut merged = Settings::default();

        if let Some(global) = &global_config {
            merged.apply(global);
        }
        if let Some(project) = &project_config {
            merged.apply(project);
        }

        Self::apply_env_overrides(&mut merged, env_overrides)?;

        // CLI flags have the highest priority
        Self::apply_cli_overrides(&mut merged, cli_overrides)?;

        Ok(merged)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(
        config: &mut Settings,
        overrides: &HashMap<String, String>,
    ) -> ConfigResult<()> {
        for (key, value) in overrides {
            match key.as_str() {
                "SPROUT_FETCH_STRATEGY" => {
                    config.fetch_strategy = value.parse()?;
                },
                "SPROUT_MAP_COMPLEX_VERSIONS" => {
                    config.resolution.map_complex_version_to_latest_stable =
                        parse_bool(key, value)?;
                },
                "SPROUT_IGNORE" => {
                    config.resolution.ignored_dependencies.extend(split_list(value));
                },
                "SPROUT_MAX_CONCURRENT_FETCHES" => {
                    config.max_concurrent_fetches = Some(parse_limit(key, value)?);
                },
                "SPROUT_PUB_EXECUTABLE" => {
                    config.pub_executable = value.clone();
                },
                "SPROUT_ARCHIVE_BASE_URL" => {
                    config.source.archive_base_url = value.clone();
                },
                "SPROUT_RAW_BASE_URL" => {
                    config.source.raw_base_url = value.clone();
                },
                _ => {
                    // Unknown environment variable, ignore
                },
            }
        }

        Ok(())
    }

    /// Apply CLI flag overrides
    fn apply_cli_overrides(
        config: &mut Settings,
        overrides: &HashMap<String, String>,
    ) -> ConfigResult<()> {
        for (key, value) in overrides {
            match key.as_str() {
                "fetch-strategy" => {
                    config.fetch_strategy = value.parse::<FetchStrategy>()?;
                },
                "ignore" => {
                    config.resolution.ignored_dependencies.extend(split_list(value));
                },
                "map-complex-versions" => {
                    config.resolution.map_complex_version_to_latest_stable =
                        parse_bool(key, value)?;
                },
                "max-concurrent-fetches" => {
                    config.max_concurrent_fetches = Some(parse_limit(key, value)?);
                },
                _ => {
                    // Unknown CLI override, ignore
                },
            }
        }

        Ok(())
    }

    /// Collect `SPROUT_*` overrides from an environment listing
    pub fn collect_env_overrides<I>(vars: I) -> HashMap<String, String>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        vars.into_iter()
            .filter(|(key, _)| key.starts_with("SPROUT_"))
            .collect()
    }
}

fn split_list(value: &str) -> impl Iterator<Item = String> + '_ {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn parse_bool(field: &str, value: &str) -> ConfigResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(SproutError::ConfigValidation {
            field: field.to_string(),
            reason: format!("expected a boolean, got '{}'", other),
        }),
    }
}

fn parse_limit(field: &str, value: &str) -> ConfigResult<usize> {
    match value.trim().parse::<usize>() {
        Ok(limit) if limit > 0 => Ok(limit),
        _ => Err(SproutError::ConfigValidation {
            field: field.to_string(),
            reason: format!("expected a positive integer, got '{}'", value),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn project_config() -> SproutToml {
        SproutToml {
            ignored_dependencies: ["core-tests".to_string()].into(),
            overridden_dependencies: [("polymer".to_string(), "Polymer/polymer#0.5".to_string())].into(),
            fetch_strategy: Some(FetchStrategy::Clone),
            ..SproutToml::default()
        }
    }

    #[tokio::test]
    async fn test_resolve_config_path_walks_up() {
        let temp_dir = TempDir::new().unwrap();
        let root = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        let nested = root.join("web").join("lib");
        tokio::fs::create_dir_all(&nested).await.unwrap();
        tokio::fs::write(root.join(SETTINGS_FILE), "fetch-strategy = \"zip\"").await.unwrap();

        let loader = ConfigLoader::new(nested);
        assert_eq!(loader.resolve_config_path(SETTINGS_FILE), root.join(SETTINGS_FILE));
    }

    #[tokio::test]
    async fn test_load_project_config() {
        let temp_dir = TempDir::new().unwrap();
        let root = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        tokio::fs::write(root.join(SETTINGS_FILE), "ignored-dependencies = [\"a\"]").await.unwrap();

        let loader = ConfigLoader::new(root.clone());
        let (config, path) = loader.load_project_config().await.unwrap().unwrap();

        assert!(config.ignored_dependencies.contains("a"));
        assert_eq!(path, root.join(SETTINGS_FILE));
    }

    #[test]
    fn test_merge_configs() {
        let global = SproutToml {
            ignored_dependencies: ["global-ignored".to_string()].into(),
            overridden_dependencies: [("polymer".to_string(), "Global/polymer".to_string())].into(),
            fetch_strategy: Some(FetchStrategy::Zip),
            pub_executable: Some("/opt/dart/bin/pub".to_string()),
            ..SproutToml::default()
        };

        let env_overrides = HashMap::from([
            ("SPROUT_MAP_COMPLEX_VERSIONS".to_string(), "true".to_string()),
            ("SPROUT_IGNORE".to_string(), "env-a, env-b".to_string()),
        ]);
        let cli_overrides = HashMap::from([("fetch-strategy".to_string(), "zip".to_string())]);

        let merged = ConfigLayering::merge_configs(
            Some(global),
            Some(project_config()),
            &env_overrides,
            &cli_overrides,
        )
        .unwrap();

        // Project overrides beat global ones
        assert_eq!(
            merged.resolution.overridden_dependencies.get("polymer").map(String::as_str),
            Some("Polymer/polymer#0.5")
        );
        // Ignore lists accumulate across layers
        for name in ["global-ignored", "core-tests", "env-a", "env-b"] {
            assert!(merged.resolution.ignored_dependencies.contains(name), "{}", name);
        }
        // Global scalar kept when the project is silent
        assert_eq!(merged.pub_executable, "/opt/dart/bin/pub");
        assert!(merged.resolution.map_complex_version_to_latest_stable);
        // CLI has the last word
        assert_eq!(merged.fetch_strategy, FetchStrategy::Zip);
    }

    #[test]
    fn test_invalid_env_override() {
        let env_overrides =
            HashMap::from([("SPROUT_MAX_CONCURRENT_FETCHES".to_string(), "zero".to_string())]);
        let result = ConfigLayering::merge_configs(None, None, &env_overrides, &HashMap::new());
        assert!(matches!(result, Err(SproutError::ConfigValidation { .. })));
    }

    #[test]
    fn test_collect_env_overrides() {
        let vars = vec![
            ("SPROUT_FETCH_STRATEGY".to_string(), "clone".to_string()),
            ("PATH".to_string(), "/usr/bin".to_string()),
        ];
        let overrides = ConfigLayering::collect_env_overrides(vars);

        assert!(overrides.contains_key("SPROUT_FETCH_STRATEGY"));
        assert!(!overrides.contains_key("PATH"));
    }
}
