//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use dossier_merge::MergeConfig;
use dossier_store::RegistryConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Registry settings
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Merger settings
    #[serde(default)]
    pub merge: MergeConfig,

    /// Global settings
    #[serde(default)]
    pub settings: Settings,
}

/// Global CLI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,

    /// Registry file used when `--registry` is not given
    #[serde(default = "default_registry_path")]
    pub registry_path: PathBuf,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
    /// Quiet (minimal) format
    Quiet,
}

impl Config {
    /// Get the default configuration file path.
    pub fn path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".dossier").join("config.toml"))
    }

    /// Load configuration from `path`, or the default location.
    ///
    /// A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::path()?,
        };

        let config = if path.exists() {
            let contents = fs::read_to_string(&path)?;
            toml::from_str(&contents)?
        } else {
            Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the registry and merge sections.
    pub fn validate(&self) -> Result<()> {
        self.registry
            .validate()
            .map_err(|e| CliError::Config(format!("[registry] {}", e)))?;
        self.merge
            .validate()
            .map_err(|e| CliError::Config(format!("[merge] {}", e)))?;
        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
            registry_path: default_registry_path(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}

fn default_registry_path() -> PathBuf {
    PathBuf::from("dossier.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.settings.color);
        assert_eq!(config.settings.format, OutputFormat::Table);
        assert_eq!(config.merge.match_threshold, 0.85);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_sections() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[registry]
evidence_excerpt_chars = 80

[merge]
match_threshold = 0.9

[settings]
format = "json"
registry_path = "deal/facts.json"
"#,
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.registry.evidence_excerpt_chars, 80);
        assert_eq!(config.registry.domains.len(), 6);
        assert_eq!(config.merge.match_threshold, 0.9);
        assert_eq!(config.settings.format, OutputFormat::Json);
        assert!(config.settings.color);
        assert_eq!(config.settings.registry_path, PathBuf::from("deal/facts.json"));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config.settings.registry_path, PathBuf::from("dossier.json"));
    }

    #[test]
    fn test_invalid_section_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[merge]\nitem_weight = 0.4\n").unwrap();
        assert!(matches!(Config::load(Some(&path)), Err(CliError::Config(_))));
    }
}
