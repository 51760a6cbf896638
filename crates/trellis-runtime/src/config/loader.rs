//! Layered configuration loading with figment.
//!
//! Sources, lowest priority first:
//!
//! 1. Built-in defaults
//! 2. Programmatic merges
//! 3. Profile file (`trellis.{profile}.toml`)
//! 4. Main file (`trellis.toml`, then `config.toml`)
//! 5. Environment variables (`TRELLIS_*`, `__` separates sections)
//!
//! Files are searched in the current directory, then in the user config
//! directory under `trellis/`. With the `yaml-config` feature the same names
//! with `.yaml`/`.yml` are searched too.
//!
//! ```rust,ignore
//! // TRELLIS_APP__NAMESPACE=Shop  ->  app.namespace = "Shop"
//! let config = ConfigLoader::new().profile("production").load()?;
//! ```

use std::path::{Path, PathBuf};

use figment::Figment;
#[cfg(any(feature = "toml-config", feature = "yaml-config"))]
use figment::providers::Format;
#[cfg(feature = "toml-config")]
use figment::providers::Toml;
#[cfg(feature = "yaml-config")]
use figment::providers::Yaml;
use figment::providers::{Env, Serialized};
use tracing::{debug, info, trace, warn};

use super::error::{ConfigError, ConfigResult};
use super::schema::TrellisConfig;

const ENV_PREFIX: &str = "TRELLIS_";

/// Configuration profile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Profile {
    #[default]
    Development,
    Production,
    Custom(String),
}

impl Profile {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Custom(name) => name,
        }
    }

    /// Parses a profile name; `dev` and `prod` are accepted as short forms.
    pub fn parse(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "development" | "dev" => Self::Development,
            other => Self::Custom(other.to_string()),
        }
    }

    /// Reads `TRELLIS_PROFILE`, defaulting to development.
    pub fn from_env() -> Self {
        std::env::var("TRELLIS_PROFILE")
            .map(|p| Self::parse(&p))
            .unwrap_or_default()
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builder for loading a [`TrellisConfig`].
pub struct ConfigLoader {
    overrides: Figment,
    profile: Profile,
    search_paths: Vec<PathBuf>,
    load_env: bool,
    config_file: Option<PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            overrides: Figment::new(),
            profile: Profile::from_env(),
            search_paths: Vec::new(),
            load_env: true,
            config_file: None,
        }
    }

    pub fn profile(mut self, profile: impl AsRef<str>) -> Self {
        self.profile = Profile::parse(profile.as_ref());
        self
    }

    /// Adds a directory to search for configuration files.
    pub fn search_path(mut self, path: impl AsRef<Path>) -> Self {
        self.search_paths.push(path.as_ref().to_path_buf());
        self
    }

    /// Loads exactly this file instead of searching.
    pub fn file(mut self, path: impl AsRef<Path>) -> Self {
        self.config_file = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn without_env(mut self) -> Self {
        self.load_env = false;
        self
    }

    /// Merges `config` over the built-in defaults.
    ///
    /// A merged config is a base layer: files and environment variables
    /// still override any key they set.
    pub fn merge(mut self, config: TrellisConfig) -> Self {
        self.overrides = self.overrides.merge(Serialized::defaults(config));
        self
    }

    /// Loads and returns the configuration.
    pub fn load(self) -> ConfigResult<TrellisConfig> {
        let profile = self.profile.clone();
        let config: TrellisConfig = self.build_figment()?.extract()?;

        debug!(
            profile = %profile,
            namespace = ?config.app.namespace,
            logging_level = %config.logging.level,
            "Configuration loaded"
        );
        Ok(config)
    }

    fn build_figment(mut self) -> ConfigResult<Figment> {
        let overrides = std::mem::take(&mut self.overrides);
        let mut figment =
            Figment::from(Serialized::defaults(TrellisConfig::default())).merge(overrides);

        match &self.config_file {
            Some(path) if path.exists() => {
                info!(path = %path.display(), "Loading configuration file");
                figment = merge_file(figment, path)?;
            }
            Some(path) => return Err(ConfigError::FileNotFound(path.clone())),
            None => figment = self.search_files(figment)?,
        }

        if self.load_env {
            trace!(prefix = ENV_PREFIX, "Loading environment variables");
            figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));
        }

        Ok(figment)
    }

    fn resolved_search_paths(&self) -> Vec<PathBuf> {
        if !self.search_paths.is_empty() {
            return self.search_paths.clone();
        }
        let mut paths = Vec::new();
        if let Ok(cwd) = std::env::current_dir() {
            paths.push(cwd);
        }
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("trellis"));
        }
        paths
    }

    #[cfg_attr(
        not(any(feature = "toml-config", feature = "yaml-config")),
        allow(unused_mut)
    )]
    fn search_files(&self, mut figment: Figment) -> ConfigResult<Figment> {
        let mut candidates: Vec<&str> = Vec::new();
        #[cfg(feature = "toml-config")]
        candidates.extend(["trellis.toml", "config.toml"]);
        #[cfg(feature = "yaml-config")]
        candidates.extend(["trellis.yaml", "trellis.yml", "config.yaml", "config.yml"]);

        for dir in self.resolved_search_paths() {
            for name in &candidates {
                let Some((stem, ext)) = name.rsplit_once('.') else {
                    continue;
                };

                let profile_path = dir.join(format!("{stem}.{}.{ext}", self.profile));
                if profile_path.exists() {
                    debug!(path = %profile_path.display(), "Loading profile configuration");
                    figment = merge_file(figment, &profile_path)?;
                }

                let path = dir.join(name);
                if path.exists() {
                    info!(path = %path.display(), "Loading configuration file");
                    return merge_file(figment, &path);
                }
            }
        }

        warn!("No configuration file found, using defaults");
        Ok(figment)
    }
}

fn merge_file(figment: Figment, path: &Path) -> ConfigResult<Figment> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
    match ext {
        #[cfg(feature = "toml-config")]
        "toml" => Ok(figment.merge(Toml::file(path))),
        #[cfg(feature = "yaml-config")]
        "yaml" | "yml" => Ok(figment.merge(Yaml::file(path))),
        _ => Err(ConfigError::UnsupportedFormat(ext.to_string())),
    }
}

/// Loads configuration from the default locations.
pub fn load_config() -> ConfigResult<TrellisConfig> {
    ConfigLoader::new().load()
}

/// Loads configuration from `path`, with environment overrides.
pub fn load_config_from_file(path: impl AsRef<Path>) -> ConfigResult<TrellisConfig> {
    ConfigLoader::new().file(path).load()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogLevel;

    #[test]
    fn test_defaults_without_sources() {
        let config = ConfigLoader::new()
            .search_path(std::env::temp_dir().join("trellis-no-such-dir"))
            .without_env()
            .load()
            .unwrap();
        assert_eq!(config.logging.level, LogLevel::Info);
        assert!(config.app.namespace.is_none());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = ConfigLoader::new()
            .file("/definitely/missing/trellis.toml")
            .without_env()
            .load();
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_programmatic_merge_applies() {
        let mut overrides = TrellisConfig::default();
        overrides.app.namespace = Some("Shop".into());

        let config = ConfigLoader::new()
            .search_path(std::env::temp_dir().join("trellis-no-such-dir"))
            .without_env()
            .merge(overrides)
            .load()
            .unwrap();
        assert_eq!(config.app.namespace.as_deref(), Some("Shop"));
    }

    fn write_config(dir_name: &str, contents: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(dir_name);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("trellis.toml");
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[cfg(feature = "toml-config")]
    #[test]
    fn test_merge_keeps_file_values() {
        let path = write_config(
            "trellis-merge-keeps-file",
            "[logging]\nlevel = \"debug\"\n",
        );

        let mut overrides = TrellisConfig::default();
        overrides.app.namespace = Some("Shop".into());

        let config = ConfigLoader::new()
            .file(&path)
            .without_env()
            .merge(overrides)
            .load()
            .unwrap();
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.app.namespace.as_deref(), Some("Shop"));
    }

    #[cfg(feature = "toml-config")]
    #[test]
    fn test_file_overrides_merged_value() {
        let path = write_config(
            "trellis-file-over-merge",
            "[app]\nnamespace = \"Storefront\"\n",
        );

        let mut overrides = TrellisConfig::default();
        overrides.app.namespace = Some("Shop".into());

        let config = ConfigLoader::new()
            .file(&path)
            .without_env()
            .merge(overrides)
            .load()
            .unwrap();
        assert_eq!(config.app.namespace.as_deref(), Some("Storefront"));
    }

    #[test]
    fn test_profile_names() {
        assert_eq!(Profile::parse("prod"), Profile::Production);
        assert_eq!(Profile::parse("Dev"), Profile::Development);
        assert_eq!(Profile::parse("staging").as_str(), "staging");
    }
}
