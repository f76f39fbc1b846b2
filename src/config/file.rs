//! Configuration file management
//!
//! Handles finding, loading, and validating configuration files.

use anyhow::{Context, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::AppConfig;

/// Configuration file locations (in order of precedence)
const CONFIG_LOCATIONS: &[&str] = &[
    "./alterego-probe.yaml",
    "./alterego-probe.yml",
    "./.alterego-probe.yaml",
    "~/.config/alterego-probe/config.yaml",
];

const SUPPORTED_VERSIONS: &[&str] = &["1.0"];

/// Full configuration file structure
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct ConfigFile {
    /// Version of config file format
    #[serde(default = "default_version")]
    pub version: String,

    /// Application settings
    #[serde(default)]
    pub app: AppConfig,

    /// Named deployments of the API
    #[serde(default = "default_environments")]
    pub environments: Vec<EnvironmentConfig>,
}

fn default_version() -> String {
    "1.0".to_string()
}

fn default_environments() -> Vec<EnvironmentConfig> {
    vec![
        EnvironmentConfig::new(
            "preview",
            "https://alterego-immo.preview.emergentagent.com/api",
        )
        .with_description("Hosted preview deployment"),
        EnvironmentConfig::new("local", "http://localhost:3000/api")
            .with_description("Next.js dev server"),
    ]
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            version: default_version(),
            app: AppConfig::default(),
            environments: default_environments(),
        }
    }
}

impl ConfigFile {
    /// Find configuration file in standard locations
    pub fn find() -> Option<PathBuf> {
        CONFIG_LOCATIONS
            .iter()
            .map(|location| expand_path(location))
            .find(|path| path.exists())
    }

    /// Load configuration from default location
    pub fn load_default() -> Result<Self> {
        match Self::find() {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = if is_yaml_file(path) {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))?
        };

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = if is_yaml_file(path) {
            serde_yaml::to_string(self).context("Failed to serialize config")?
        } else {
            serde_json::to_string_pretty(self).context("Failed to serialize config")?
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !SUPPORTED_VERSIONS.contains(&self.version.as_str()) {
            anyhow::bail!("Unsupported config version: {}", self.version);
        }

        if self.app.timeout_secs == 0 || self.app.estimate_timeout_secs == 0 {
            anyhow::bail!("Timeouts must be at least one second");
        }

        if !(0.0..=100.0).contains(&self.app.min_pass_rate) {
            anyhow::bail!(
                "min_pass_rate must be between 0 and 100, got {}",
                self.app.min_pass_rate
            );
        }

        for (i, env) in self.environments.iter().enumerate() {
            if env.name.trim().is_empty() {
                anyhow::bail!("Environment #{} has an empty name", i + 1);
            }
            reqwest::Url::parse(&env.base_url).with_context(|| {
                format!("Invalid base_url for environment '{}': {}", env.name, env.base_url)
            })?;
            if self.environments[..i].iter().any(|e| e.name == env.name) {
                anyhow::bail!("Duplicate environment name: {}", env.name);
            }
        }

        if self.environment(&self.app.default_environment).is_none() {
            anyhow::bail!(
                "default_environment '{}' is not defined in environments",
                self.app.default_environment
            );
        }

        Ok(())
    }

    /// Example configuration written by `config init`
    pub fn example() -> Self {
        let mut config = Self::default();
        config.app.min_pass_rate = 80.0;
        config
    }

    /// Get environment by name
    pub fn environment(&self, name: &str) -> Option<&EnvironmentConfig> {
        self.environments.iter().find(|e| e.name == name)
    }

    pub fn environment_names(&self) -> Vec<&str> {
        self.environments.iter().map(|e| e.name.as_str()).collect()
    }

    /// JSON schema of the config file
    pub fn schema() -> Result<String> {
        let schema = schemars::schema_for!(ConfigFile);
        serde_json::to_string_pretty(&schema).context("Failed to serialize schema")
    }
}

/// One deployment of the API
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct EnvironmentConfig {
    /// Environment name (e.g., "preview", "local")
    pub name: String,
    /// API base URL including the `/api` prefix
    pub base_url: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl EnvironmentConfig {
    pub fn new(name: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Expand ~ to home directory
fn expand_path(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

/// Check if file is YAML based on extension
fn is_yaml_file(path: &Path) -> bool {
    path.extension()
        .map(|e| e == "yaml" || e == "yml")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_environments() {
        let config = ConfigFile::default();
        assert_eq!(config.environment_names(), vec!["preview", "local"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_save_and_load_yaml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("alterego-probe.yaml");

        let mut config = ConfigFile::example();
        config
            .environments
            .push(EnvironmentConfig::new("staging", "https://staging.example.com/api"));
        config.save(&path).unwrap();

        let loaded = ConfigFile::load(&path).unwrap();
        assert_eq!(loaded.app.min_pass_rate, 80.0);
        assert_eq!(
            loaded.environment("staging").unwrap().base_url,
            "https://staging.example.com/api"
        );
    }

    #[test]
    fn test_save_and_load_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        ConfigFile::default().save(&path).unwrap();
        assert!(ConfigFile::load(&path).is_ok());
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("partial.yaml");
        std::fs::write(&path, "app:\n  timeout_secs: 15\n  suites: [otp, dvf-dates]\n").unwrap();

        let loaded = ConfigFile::load(&path).unwrap();
        assert_eq!(loaded.app.timeout_secs, 15);
        assert_eq!(loaded.app.estimate_timeout_secs, 30);
        assert_eq!(
            loaded.app.suites,
            vec![crate::models::Suite::Otp, crate::models::Suite::DvfDates]
        );
        assert!(loaded.environment("preview").is_some());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = ConfigFile::default();
        config.version = "9.9".to_string();
        assert!(config.validate().is_err());

        let mut config = ConfigFile::default();
        config.app.min_pass_rate = 120.0;
        assert!(config.validate().is_err());

        let mut config = ConfigFile::default();
        config.environments.push(EnvironmentConfig::new("local", "http://other/api"));
        assert!(config.validate().is_err());

        let mut config = ConfigFile::default();
        config.environments[0].base_url = "not a url".to_string();
        assert!(config.validate().is_err());

        let mut config = ConfigFile::default();
        config.app.default_environment = "prod".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_schema_mentions_fields() {
        let schema = ConfigFile::schema().unwrap();
        assert!(schema.contains("environments"));
        assert!(schema.contains("bypass_phone"));
    }

    #[test]
    fn test_expand_path() {
        assert_eq!(expand_path("./x.yaml"), PathBuf::from("./x.yaml"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_path("~/a.yaml"), home.join("a.yaml"));
        }
    }
}
