//! Configuration management for doclens.
//!
//! Loads configuration from ${DOCLENS_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::providers::gemini::GeminiConfig;

/// Default config template with comments.
///
/// This is embedded from default_config.toml at compile time.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

pub mod paths {
    //! Path resolution for doclens configuration and log directories.
    //!
    //! DOCLENS_HOME resolution order:
    //! 1. DOCLENS_HOME environment variable (if set)
    //! 2. ~/.config/doclens (default)
    //! 3. ./.doclens when no home directory can be determined

    use std::path::PathBuf;

    /// Returns the doclens home directory.
    pub fn doclens_home() -> PathBuf {
        if let Ok(home) = std::env::var("DOCLENS_HOME")
            && !home.trim().is_empty()
        {
            return PathBuf::from(home);
        }

        dirs::home_dir().map_or_else(
            || PathBuf::from(".doclens"),
            |h| h.join(".config").join("doclens"),
        )
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        doclens_home().join("config.toml")
    }

    /// Returns the directory for rolling log files.
    pub fn logs_dir() -> PathBuf {
        doclens_home().join("logs")
    }
}

/// Gemini provider settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GeminiSettings {
    /// Optional API key (overrides GEMINI_API_KEY).
    pub api_key: Option<String>,
    /// Optional API base URL (for proxies).
    pub base_url: Option<String>,
}

impl GeminiSettings {
    /// Returns the effective API key if set and non-empty.
    pub fn effective_api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Returns the effective base URL if set and non-empty.
    pub fn effective_base_url(&self) -> Option<&str> {
        self.base_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// The Gemini model to use
    pub model: String,

    /// Maximum output tokens per answer (optional)
    pub max_output_tokens: Option<u32>,

    pub gemini: GeminiSettings,
}

impl Config {
    pub const DEFAULT_MODEL: &str = "gemini-1.5-pro";

    /// Loads configuration from the default config path.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Builds the Gemini client configuration, resolving credentials from config and env.
    ///
    /// # Errors
    /// Returns an error if no API key is available or the base URL is invalid.
    pub fn gemini_config(&self) -> Result<GeminiConfig> {
        let model = self.model.trim();
        let model = if model.is_empty() {
            Self::DEFAULT_MODEL
        } else {
            model
        };
        GeminiConfig::from_env(
            model.to_string(),
            self.max_output_tokens,
            self.gemini.effective_base_url(),
            self.gemini.effective_api_key(),
        )
    }

    /// Creates a default config file at the given path.
    ///
    /// # Errors
    /// Returns an error if the file already exists or cannot be written.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, default_config_template())
    }

    /// Writes config content to a file, creating parent directories as needed.
    /// Uses atomic write (temp file + rename) to prevent corruption.
    fn write_config(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: Self::DEFAULT_MODEL.to_string(),
            max_output_tokens: None,
            gemini: GeminiSettings::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("nonexistent.toml")).unwrap();
        assert_eq!(config.model, "gemini-1.5-pro");
        assert_eq!(config.max_output_tokens, None);
        assert_eq!(config.gemini.effective_api_key(), None);
    }

    #[test]
    fn test_load_partial_config_merges_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, "max_output_tokens = 1024\n").unwrap();

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.model, "gemini-1.5-pro");
        assert_eq!(config.max_output_tokens, Some(1024));
    }

    #[test]
    fn test_selection_limit_is_not_configurable() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, "max_files = 10\nmodel = \"gemini-2.0-flash\"\n").unwrap();

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.model, "gemini-2.0-flash");
        assert!(!default_config_template().contains("max_files"));
    }

    #[test]
    fn test_gemini_section_loaded_from_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(
            &config_path,
            "model = \"gemini-2.5-flash\"\n[gemini]\napi_key = \" key-from-file \"\nbase_url = \"https://proxy.example.com/v1beta\"\n",
        )
        .unwrap();

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.model, "gemini-2.5-flash");
        assert_eq!(config.gemini.effective_api_key(), Some("key-from-file"));
        assert_eq!(
            config.gemini.effective_base_url(),
            Some("https://proxy.example.com/v1beta")
        );
    }

    #[test]
    fn test_blank_settings_are_none() {
        let settings = GeminiSettings {
            api_key: Some("   ".to_string()),
            base_url: Some(String::new()),
        };
        assert_eq!(settings.effective_api_key(), None);
        assert_eq!(settings.effective_base_url(), None);
    }

    #[test]
    fn test_invalid_toml_is_error() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, "model = [").unwrap();
        assert!(Config::load_from(&config_path).is_err());
    }

    #[test]
    fn test_init_creates_config_with_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("subdir").join("config.toml");

        Config::init(&config_path).unwrap();

        let contents = fs::read_to_string(&config_path).unwrap();
        assert!(contents.contains("gemini-1.5-pro"));
        assert!(contents.contains("# max_output_tokens ="));
        let parsed = Config::load_from(&config_path).unwrap();
        assert_eq!(parsed.model, Config::DEFAULT_MODEL);
    }

    #[test]
    fn test_init_fails_if_exists() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, "").unwrap();

        assert!(Config::init(&config_path).is_err());
    }

    #[test]
    fn test_gemini_config_uses_api_key_from_file() {
        let config = Config {
            model: "  ".to_string(),
            max_output_tokens: Some(256),
            gemini: GeminiSettings {
                api_key: Some("file-key".to_string()),
                base_url: Some("https://proxy.example.com/v1beta".to_string()),
            },
        };

        let gemini = config.gemini_config().unwrap();
        assert_eq!(gemini.api_key, "file-key");
        assert_eq!(gemini.model, Config::DEFAULT_MODEL);
        assert_eq!(gemini.max_output_tokens, Some(256));
    }
}
