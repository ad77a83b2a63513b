//! Configuration management for shukka
//!
//! Config stored at: ~/.config/shukka/config.json

use serde::{Deserialize, Serialize};
use shukka_types::{ConfigError, OutputFormat, Result};
use std::path::PathBuf;

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Data directory override
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Default output format (json, table)
    #[serde(default)]
    pub output_format: OutputFormat,

    /// Session lifetime handed to the UI layer at session start (minutes)
    #[serde(default = "default_session_timeout")]
    pub session_timeout_minutes: u32,
}

fn default_session_timeout() -> u32 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            output_format: OutputFormat::default(),
            session_timeout_minutes: default_session_timeout(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or(ConfigError::NotFound)?
            .join("shukka");
        Ok(config_dir)
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Directory holding the database file
    pub fn store_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.data_dir {
            return Ok(dir.clone());
        }

        let data_dir = dirs::data_dir()
            .ok_or(ConfigError::NotFound)?
            .join("shukka");
        Ok(data_dir)
    }

    pub fn session_timeout(&self) -> chrono::Duration {
        chrono::Duration::minutes(i64::from(self.session_timeout_minutes))
    }

    /// Load config from file, or create default
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            Self::from_json(&content)
        } else {
            Ok(Config::default())
        }
    }

    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| ConfigError::ParseError(e.to_string()).into())
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        // Ensure directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content)?;
        Ok(())
    }
}

impl std::fmt::Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Shukka Configuration")?;
        writeln!(f, "====================")?;
        writeln!(f)?;
        writeln!(
            f,
            "Data dir:        {}",
            self.store_dir()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|_| "(error)".to_string())
        )?;
        writeln!(f, "Output format:   {}", self.output_format)?;
        writeln!(f, "Session timeout: {} min", self.session_timeout_minutes)?;

        if let Ok(path) = Self::config_path() {
            writeln!(f)?;
            writeln!(f, "Config file:     {}", path.display())?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config = Config::from_json("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.session_timeout().num_minutes(), 30);
    }

    #[test]
    fn test_data_dir_override() {
        let config = Config::from_json(r#"{"data_dir": "/srv/shukka", "output_format": "json"}"#)
            .unwrap();
        assert_eq!(config.store_dir().unwrap(), PathBuf::from("/srv/shukka"));
        assert_eq!(config.output_format, OutputFormat::Json);
    }

    #[test]
    fn test_bad_json_is_config_error() {
        assert!(matches!(
            Config::from_json("{"),
            Err(shukka_types::Error::Config(ConfigError::ParseError(_)))
        ));
    }
}
