use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Result, anyhow};

pub const DEFAULT_SERVER_URL: &str = "http://localhost:8000";
pub const DEFAULT_GEO_URL: &str = "http://ip-api.com/json";

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Config {
    pub server_url: Option<String>,
    pub geo_url: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self {
            server_url: None,
            geo_url: None,
        }
    }

    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            return Ok(Self::new());
        }

        Self::load_from(&config_path)
    }

    /// Write a template config on first run so users can find the file.
    pub fn ensure_saved(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;
        if !config_path.exists() {
            self.save_to(&config_path)?;
        }
        Ok(())
    }

    fn load_from(path: &Path) -> Result<Self> {
        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    /// Prediction service base URL: env var first, then config file,
    /// then the local default.
    pub fn server_url(&self) -> String {
        std::env::var("SYMPTOM_SERVER_URL")
            .ok()
            .or_else(|| self.server_url.clone())
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string())
    }

    pub fn geo_url(&self) -> String {
        self.geo_url
            .clone()
            .unwrap_or_else(|| DEFAULT_GEO_URL.to_string())
    }

    fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("symptoms").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_partial_config() {
        let config: Config =
            serde_json::from_str(r#"{"server_url":"http://example.test:9000","geo_url":null}"#)
                .unwrap();
        assert_eq!(config.server_url.as_deref(), Some("http://example.test:9000"));
        assert_eq!(config.geo_url(), DEFAULT_GEO_URL);
    }

    #[test]
    fn test_geo_url_override() {
        let config = Config {
            server_url: None,
            geo_url: Some("http://geo.test/json".to_string()),
        };
        assert_eq!(config.geo_url(), "http://geo.test/json");
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = Config {
            server_url: Some("http://example.test:9000".to_string()),
            geo_url: None,
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.server_url.as_deref(), Some("http://example.test:9000"));
        assert_eq!(loaded.geo_url, None);
    }
}
