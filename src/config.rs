//! Configuration management for MicroFavola
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{MicrofavolaError, Result};
use crate::themes::ThemeId;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Upper bound for `generation.retry_backoff_ms`
pub const MAX_RETRY_BACKOFF_MS: u64 = 60_000;

/// Main configuration structure for MicroFavola
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Generation API settings
    #[serde(default)]
    pub generation: GenerationConfig,

    /// History persistence settings
    #[serde(default)]
    pub history: HistoryConfig,

    /// Theme selected when a session starts
    #[serde(default)]
    pub default_theme: ThemeId,
}

/// Generation API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Base URL of the generation API (useful for tests and local mocks)
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// Language the story must be written in
    #[serde(default = "default_language")]
    pub language: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Timeout for a single generation request (seconds)
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Extra attempts after a transient transport failure
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base backoff between attempts (milliseconds), doubled on each retry
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// API credential, only ever read from the environment
    #[serde(skip)]
    pub api_key: String,
}

fn default_api_base() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_model() -> String {
    "gemini-3-flash-preview".to_string()
}

fn default_language() -> String {
    "italiano".to_string()
}

fn default_temperature() -> f32 {
    1.1
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    2
}

fn default_retry_backoff_ms() -> u64 {
    500
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            model: default_model(),
            language: default_language(),
            temperature: default_temperature(),
            timeout_seconds: default_timeout_seconds(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
            api_key: String::new(),
        }
    }
}

impl GenerationConfig {
    /// Request timeout as a `Duration`
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Base retry backoff as a `Duration`
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

/// History persistence configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HistoryConfig {
    /// Directory of the history database; the platform data dir when unset
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Returns
    ///
    /// Returns the loaded and merged configuration
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            tracing::error!("Failed to read config file {}: {}", path, e);
            MicrofavolaError::Io(e)
        })?;
        serde_yaml::from_str(&contents).map_err(|e| {
            tracing::error!("Failed to parse config file {}: {}", path, e);
            MicrofavolaError::Yaml(e).into()
        })
    }

    fn apply_env_vars(&mut self) {
        // Missing credential is not an error here; the first call will fail.
        self.generation.api_key = std::env::var("API_KEY")
            .or_else(|_| std::env::var("GEMINI_API_KEY"))
            .unwrap_or_default();
        if self.generation.api_key.is_empty() {
            tracing::debug!("No API key found in API_KEY or GEMINI_API_KEY");
        }

        if let Ok(api_base) = std::env::var("MICROFAVOLA_API_BASE") {
            tracing::debug!(api_base = %api_base, "Env override: MICROFAVOLA_API_BASE");
            self.generation.api_base = api_base;
        }

        if let Ok(model) = std::env::var("MICROFAVOLA_MODEL") {
            tracing::debug!(model = %model, "Env override: MICROFAVOLA_MODEL");
            self.generation.model = model;
        }

        if let Ok(language) = std::env::var("MICROFAVOLA_LANGUAGE") {
            tracing::debug!(language = %language, "Env override: MICROFAVOLA_LANGUAGE");
            self.generation.language = language;
        }

        if let Ok(timeout) = std::env::var("MICROFAVOLA_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.generation.timeout_seconds = value;
            } else {
                tracing::warn!("Invalid MICROFAVOLA_TIMEOUT_SECONDS: {}", timeout);
            }
        }

        if let Ok(retries) = std::env::var("MICROFAVOLA_MAX_RETRIES") {
            if let Ok(value) = retries.parse() {
                self.generation.max_retries = value;
            } else {
                tracing::warn!("Invalid MICROFAVOLA_MAX_RETRIES: {}", retries);
            }
        }

        if let Ok(db_path) = std::env::var("MICROFAVOLA_HISTORY_DB") {
            tracing::debug!(db_path = %db_path, "Env override: MICROFAVOLA_HISTORY_DB");
            self.history.path = Some(PathBuf::from(db_path));
        }

        if let Ok(theme) = std::env::var("MICROFAVOLA_THEME") {
            match theme.parse::<ThemeId>() {
                Ok(id) => self.default_theme = id,
                Err(_) => tracing::warn!("Invalid MICROFAVOLA_THEME: {}, using default", theme),
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }

        if let Some(storage_path) = &cli.storage_path {
            tracing::info!("Using history storage override from CLI: {}", storage_path);
            self.history.path = Some(PathBuf::from(storage_path));
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        if self.generation.model.trim().is_empty() {
            return Err(
                MicrofavolaError::Config("generation.model cannot be empty".to_string()).into(),
            );
        }

        if self.generation.api_base.trim().is_empty() {
            return Err(
                MicrofavolaError::Config("generation.api_base cannot be empty".to_string()).into(),
            );
        }

        if self.generation.timeout_seconds == 0 {
            return Err(MicrofavolaError::Config(
                "generation.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if !(0.0..=2.0).contains(&self.generation.temperature) {
            return Err(MicrofavolaError::Config(
                "generation.temperature must be between 0.0 and 2.0".to_string(),
            )
            .into());
        }

        if self.generation.max_retries > 10 {
            return Err(MicrofavolaError::Config(
                "generation.max_retries must be less than or equal to 10".to_string(),
            )
            .into());
        }

        if self.generation.retry_backoff_ms > MAX_RETRY_BACKOFF_MS {
            return Err(MicrofavolaError::Config(format!(
                "generation.retry_backoff_ms must be less than or equal to {}",
                MAX_RETRY_BACKOFF_MS
            ))
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn cli() -> crate::cli::Cli {
        crate::cli::Cli {
            config: None,
            verbose: false,
            storage_path: None,
            command: crate::cli::Commands::Themes,
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.generation.model, "gemini-3-flash-preview");
        assert_eq!(config.generation.language, "italiano");
        assert_eq!(config.generation.timeout_seconds, 30);
        assert_eq!(config.generation.max_retries, 2);
        assert_eq!(config.default_theme, ThemeId::Poetico);
        assert!(config.history.path.is_none());
    }

    #[test]
    fn test_config_validation_success() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_config_validation_empty_model() {
        let mut config = Config::default();
        config.generation.model = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_zero_timeout() {
        let mut config = Config::default();
        config.generation.timeout_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_temperature_range() {
        let mut config = Config::default();
        config.generation.temperature = 2.5;
        assert!(config.validate().is_err());

        config.generation.temperature = 0.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_too_many_retries() {
        let mut config = Config::default();
        config.generation.max_retries = 11;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_retry_backoff_bound() {
        let mut config = Config::default();
        config.generation.retry_backoff_ms = u64::MAX;
        assert!(config.validate().is_err());

        config.generation.retry_backoff_ms = MAX_RETRY_BACKOFF_MS;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_yaml() {
        let yaml = r#"
generation:
  api_base: http://localhost:8080
  model: gemini-2.5-flash
  language: english
  temperature: 0.9
  timeout_seconds: 10
history:
  path: /tmp/microfavola-history
default_theme: noir
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.generation.api_base, "http://localhost:8080");
        assert_eq!(config.generation.model, "gemini-2.5-flash");
        assert_eq!(config.generation.language, "english");
        assert_eq!(config.generation.timeout_seconds, 10);
        assert_eq!(config.generation.max_retries, 2);
        assert_eq!(
            config.history.path,
            Some(PathBuf::from("/tmp/microfavola-history"))
        );
        assert_eq!(config.default_theme, ThemeId::Noir);
    }

    #[test]
    fn test_from_file_reports_yaml_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("config.yaml");
        std::fs::write(&path, "generation: [unclosed").unwrap();

        let err = Config::from_file(path.to_str().unwrap()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MicrofavolaError>(),
            Some(MicrofavolaError::Yaml(_))
        ));
    }

    #[test]
    fn test_from_file_reports_io_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("absent.yaml");

        let err = Config::from_file(path.to_str().unwrap()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MicrofavolaError>(),
            Some(MicrofavolaError::Io(_))
        ));
    }

    #[test]
    fn test_api_key_is_never_serialized() {
        let mut config = Config::default();
        config.generation.api_key = "secret".to_string();
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(!yaml.contains("secret"));
    }

    #[test]
    #[serial]
    fn test_load_nonexistent_file_uses_defaults() {
        let config = Config::load("nonexistent.yaml", &cli()).unwrap();
        assert_eq!(config.generation.model, "gemini-3-flash-preview");
    }

    #[test]
    #[serial]
    fn test_apply_env_vars_overrides_generation_fields() {
        std::env::set_var("API_KEY", "key-from-env");
        std::env::set_var("MICROFAVOLA_MODEL", "gemini-test");
        std::env::set_var("MICROFAVOLA_TIMEOUT_SECONDS", "not-a-number");
        std::env::set_var("MICROFAVOLA_THEME", "Horror");

        let mut config = Config::default();
        config.apply_env_vars();

        std::env::remove_var("API_KEY");
        std::env::remove_var("MICROFAVOLA_MODEL");
        std::env::remove_var("MICROFAVOLA_TIMEOUT_SECONDS");
        std::env::remove_var("MICROFAVOLA_THEME");

        assert_eq!(config.generation.api_key, "key-from-env");
        assert_eq!(config.generation.model, "gemini-test");
        assert_eq!(config.generation.timeout_seconds, 30);
        assert_eq!(config.default_theme, ThemeId::Horror);
    }

    #[test]
    #[serial]
    fn test_missing_api_key_yields_empty_credential() {
        std::env::remove_var("API_KEY");
        std::env::remove_var("GEMINI_API_KEY");

        let mut config = Config::default();
        config.apply_env_vars();
        assert!(config.generation.api_key.is_empty());
    }

    #[test]
    #[serial]
    fn test_cli_storage_path_override() {
        let mut cli = cli();
        cli.storage_path = Some("/tmp/other-history".to_string());

        let mut config = Config::default();
        config.apply_cli_overrides(&cli);
        assert_eq!(
            config.history.path,
            Some(PathBuf::from("/tmp/other-history"))
        );
    }
}
