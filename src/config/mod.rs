//! Configuration management for PeaceNet

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::gemini::GeminiSettings;
use crate::gemini::client::{DEFAULT_BASE_URL, DEFAULT_SYSTEM_INSTRUCTION};
use crate::gemini::models::DEFAULT_MODEL;

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Gemini model used for support replies
    pub model: String,

    /// Gemini API base URL
    pub api_base_url: String,

    /// Persona instruction sent with every chat request
    pub system_instruction: String,

    /// HTTP timeout for a single reply request; 0 disables it
    pub request_timeout_secs: u64,

    /// Pause between a correct quiz answer and chapter completion
    pub completion_delay_ms: u64,

    /// Catalog file to load instead of the built-in demo catalog
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_path: Option<PathBuf>,

    /// Column width for wrapped console output
    pub wrap_width: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_base_url: DEFAULT_BASE_URL.to_string(),
            system_instruction: DEFAULT_SYSTEM_INSTRUCTION.to_string(),
            request_timeout_secs: 120,
            completion_delay_ms: 1500,
            catalog_path: None,
            wrap_width: 80,
        }
    }
}

impl Config {
    /// Load configuration from disk, or create default if not exists
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from a specific file, creating it if missing
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {:?}", path))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config {:?}", path))
        } else {
            let config = Self::default();
            config.save_to(path)?;
            tracing::debug!("Wrote default config to {:?}", path);
            Ok(config)
        }
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }

        let contents =
            serde_json::to_string_pretty(self).with_context(|| "Failed to serialize config")?;

        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config to {:?}", path))?;

        Ok(())
    }

    /// Get the path to the config file
    pub fn config_path() -> Result<PathBuf> {
        let proj_dirs =
            ProjectDirs::from("", "", "peacenet").context("Failed to determine config directory")?;
        Ok(proj_dirs.config_dir().join("config.json"))
    }

    /// Settings for the Gemini client
    pub fn gemini_settings(&self) -> GeminiSettings {
        GeminiSettings {
            base_url: self.api_base_url.clone(),
            model: self.model.clone(),
            system_instruction: self.system_instruction.clone(),
            timeout: (self.request_timeout_secs > 0)
                .then(|| Duration::from_secs(self.request_timeout_secs)),
        }
    }

    pub fn completion_delay(&self) -> Duration {
        Duration::from_millis(self.completion_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::gemini::GeminiClient;

    #[test]
    fn default_config_uses_flash_model() {
        let config = Config::default();
        assert_eq!(config.model, "models/gemini-2.5-flash");
        assert_eq!(config.completion_delay(), Duration::from_millis(1500));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let json = r#"{"model":"models/gemini-2.0-flash","wrap_width":60}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.model, "models/gemini-2.0-flash");
        assert_eq!(config.wrap_width, 60);
        assert_eq!(config.request_timeout_secs, 120);
        assert!(config.catalog_path.is_none());
    }

    #[test]
    fn gemini_settings_follow_config() {
        let config = Config { request_timeout_secs: 5, ..Default::default() };
        let settings = config.gemini_settings();
        assert_eq!(settings.timeout, Some(Duration::from_secs(5)));
        assert_eq!(settings.system_instruction, DEFAULT_SYSTEM_INSTRUCTION);
    }

    #[test]
    fn zero_timeout_means_none() {
        let config = Config { request_timeout_secs: 0, ..Default::default() };
        assert_eq!(config.gemini_settings().timeout, None);
        assert!(GeminiClient::new(config.gemini_settings(), None).is_ok());
    }

    #[test]
    fn load_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config, Config::default());
        assert!(path.exists());
    }

    #[test]
    fn save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let config = Config {
            catalog_path: Some(PathBuf::from("/tmp/catalog.json")),
            completion_delay_ms: 0,
            ..Default::default()
        };

        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }
}
