//! Configuration management.
//!
//! Optional settings read from `~/.garminconnect/config.yaml`, next to
//! the token bundle. Most installs never create the file; the defaults
//! target the international Garmin deployment.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::connect::{connect_api_url, DEFAULT_DOMAIN, TOKEN_DIR_NAME};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Garmin domain, either `garmin.com` or `garmin.cn`.
    pub domain: String,

    /// Override for the Connect API base URL (proxies, self-hosted mocks).
    pub connect_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            domain: DEFAULT_DOMAIN.to_string(),
            connect_url: None,
        }
    }
}

impl Config {
    /// Loads the config file, falling back to defaults when absent.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config = serde_saphyr::from_str(&raw)
            .map_err(|e| anyhow::anyhow!("Invalid config file {}: {e}", path.display()))?;

        Ok(config)
    }

    /// Path of the config file inside the token directory.
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find home directory"))?
            .join(TOKEN_DIR_NAME);

        Ok(config_dir.join("config.yaml"))
    }

    /// Base URL for Connect API requests, honoring the override.
    pub fn connect_base_url(&self) -> String {
        self.connect_url
            .clone()
            .unwrap_or_else(|| connect_api_url(&self.domain))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_domain() {
        let config = Config::default();
        assert_eq!(config.domain, "garmin.com");
        assert!(config.connect_url.is_none());
    }

    #[test]
    fn test_connect_base_url_from_domain() {
        let config = Config {
            domain: "garmin.cn".to_string(),
            connect_url: None,
        };
        assert_eq!(config.connect_base_url(), "https://connectapi.garmin.cn");
    }

    #[test]
    fn test_connect_base_url_override_wins() {
        let config = Config {
            domain: "garmin.com".to_string(),
            connect_url: Some("http://127.0.0.1:8734".to_string()),
        };
        assert_eq!(config.connect_base_url(), "http://127.0.0.1:8734");
    }

    #[test]
    fn test_parse_yaml_partial_keys() {
        let config: Config = serde_saphyr::from_str("domain: garmin.cn\n").unwrap();
        assert_eq!(config.domain, "garmin.cn");
        assert!(config.connect_url.is_none());
    }
}
