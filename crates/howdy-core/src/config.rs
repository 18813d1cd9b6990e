use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Result, anyhow};

/// Where queries go when nothing else is configured.
pub const DEFAULT_ORCHESTRATOR_URL: &str =
    "https://us-central1-wf-hack25dfw-647.cloudfunctions.net/orchestrator_v2";

/// Environment override for the orchestrator endpoint.
pub const URL_ENV_VAR: &str = "ORCHESTRATOR_CF_URL";

const APP_DIR: &str = "wellsec-howdy";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub orchestrator_url: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<PathBuf> {
        let config_path = Self::get_config_path()?;
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    /// Pick the endpoint: an explicit value (flag or env var) wins, then the
    /// config file, then the built-in default. Blank strings count as unset.
    pub fn resolve_url(&self, explicit: Option<&str>) -> String {
        explicit
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .or_else(|| {
                self.orchestrator_url
                    .as_deref()
                    .map(str::trim)
                    .filter(|url| !url.is_empty())
            })
            .unwrap_or(DEFAULT_ORCHESTRATOR_URL)
            .to_string()
    }

    /// `~/.config/wellsec-howdy` (or the platform equivalent).
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join(APP_DIR))
    }

    pub fn get_config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_url_falls_back_to_default() {
        let config = Config::new();
        assert_eq!(config.resolve_url(None), DEFAULT_ORCHESTRATOR_URL);
        assert_eq!(config.resolve_url(Some("   ")), DEFAULT_ORCHESTRATOR_URL);
    }

    #[test]
    fn test_resolve_url_prefers_explicit_over_file() {
        let config = Config {
            orchestrator_url: Some("http://from-file/orchestrator".to_string()),
        };
        assert_eq!(config.resolve_url(None), "http://from-file/orchestrator");
        assert_eq!(
            config.resolve_url(Some("http://from-env/orchestrator")),
            "http://from-env/orchestrator"
        );
    }

    #[test]
    fn test_blank_file_value_is_ignored() {
        let config = Config {
            orchestrator_url: Some(String::new()),
        };
        assert_eq!(config.resolve_url(None), DEFAULT_ORCHESTRATOR_URL);
    }

    #[test]
    fn test_missing_file_loads_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("nope.json")).unwrap();
        assert_eq!(config, Config::new());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            orchestrator_url: Some("http://localhost:8080/orchestrator".to_string()),
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
