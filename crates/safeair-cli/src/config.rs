//! Configuration file management.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use safeair_core::poller::DEFAULT_POLL_INTERVAL;
use safeair_core::{Thresholds, live_url_from_env, maps_api_key_from_env};
use serde::{Deserialize, Serialize};

/// Configuration file structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Backend base URL
    #[serde(default)]
    pub base_url: Option<String>,

    /// Map provider API key
    #[serde(default)]
    pub maps_api_key: Option<String>,

    /// Default output format
    #[serde(default)]
    pub format: Option<String>,

    /// Disable colored output
    #[serde(default)]
    pub no_color: bool,

    /// Polling interval in seconds
    #[serde(default)]
    pub poll_interval_secs: Option<u64>,

    /// Lower bound of the elevated band in ppm
    #[serde(default)]
    pub elevated_threshold: Option<f64>,

    /// Lower bound of the high band in ppm
    #[serde(default)]
    pub high_threshold: Option<f64>,
}

impl Config {
    /// Get the config file path
    pub fn path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("safeair")
            .join("config.toml")
    }

    /// Load config from file, or return default if not found
    pub fn load() -> Self {
        Self::load_from(&Self::path())
    }

    /// Load config from `path`, or return default if missing or unreadable.
    pub fn load_from(path: &Path) -> Self {
        if path.exists() {
            match fs::read_to_string(path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        eprintln!("Warning: Failed to parse config: {}", e);
                    }
                },
                Err(e) => {
                    eprintln!("Warning: Failed to read config: {}", e);
                }
            }
        }
        Self::default()
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path())
    }

    /// Save config to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }

    /// Severity thresholds, falling back to the defaults for unset values.
    pub fn thresholds(&self) -> Result<Thresholds> {
        let defaults = Thresholds::default();
        let thresholds = Thresholds::new(
            self.elevated_threshold.unwrap_or(defaults.elevated),
            self.high_threshold.unwrap_or(defaults.high),
        )
        .context("Invalid thresholds in config")?;
        Ok(thresholds)
    }

    /// Polling interval, falling back to the default.
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_POLL_INTERVAL)
    }
}

/// Resolve the backend URL: flag or `SAFEAIR_LIVE_URL`, then config, then `LIVE_URL`.
pub fn resolve_base_url(arg: Option<String>, config: &Config) -> Option<String> {
    non_empty(arg)
        .or_else(|| non_empty(config.base_url.clone()))
        .or_else(live_url_from_env)
}

/// Resolve the map key: flag or `SAFEAIR_MAPS_API_KEY`, then config.
pub fn resolve_maps_api_key(arg: Option<String>, config: &Config) -> Option<String> {
    non_empty(arg)
        .or_else(|| non_empty(config.maps_api_key.clone()))
        .or_else(maps_api_key_from_env)
}

/// Resolve polling interval: explicit flag, then config, then default.
pub fn resolve_interval(arg: Option<u64>, config: &Config) -> Duration {
    arg.filter(|secs| *secs > 0)
        .map(Duration::from_secs)
        .unwrap_or_else(|| config.poll_interval())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_base_url_prefers_arg() {
        let config = Config {
            base_url: Some("http://config:8080".to_string()),
            ..Default::default()
        };
        let result = resolve_base_url(Some("http://arg:8080".to_string()), &config);
        assert_eq!(result, Some("http://arg:8080".to_string()));
    }

    #[test]
    fn test_resolve_base_url_falls_back_to_config() {
        let config = Config {
            base_url: Some("http://config:8080".to_string()),
            ..Default::default()
        };
        assert_eq!(
            resolve_base_url(None, &config),
            Some("http://config:8080".to_string())
        );
        // Blank flags do not shadow the config.
        assert_eq!(
            resolve_base_url(Some("  ".to_string()), &config),
            Some("http://config:8080".to_string())
        );
    }

    #[test]
    fn test_resolve_maps_api_key_prefers_arg() {
        let config = Config {
            maps_api_key: Some("from-config".to_string()),
            ..Default::default()
        };
        assert_eq!(
            resolve_maps_api_key(Some("from-flag".to_string()), &config),
            Some("from-flag".to_string())
        );
        assert_eq!(
            resolve_maps_api_key(None, &config),
            Some("from-config".to_string())
        );
    }

    #[test]
    fn test_resolve_interval() {
        let config = Config {
            poll_interval_secs: Some(10),
            ..Default::default()
        };
        assert_eq!(resolve_interval(Some(5), &config), Duration::from_secs(5));
        assert_eq!(resolve_interval(None, &config), Duration::from_secs(10));
        assert_eq!(
            resolve_interval(None, &Config::default()),
            DEFAULT_POLL_INTERVAL
        );
    }

    #[test]
    fn test_zero_interval_uses_default() {
        let config = Config {
            poll_interval_secs: Some(0),
            ..Default::default()
        };
        assert_eq!(config.poll_interval(), DEFAULT_POLL_INTERVAL);
    }

    #[test]
    fn test_thresholds_default_and_override() {
        assert_eq!(Config::default().thresholds().unwrap(), Thresholds::default());

        let config = Config {
            high_threshold: Some(1200.0),
            ..Default::default()
        };
        let thresholds = config.thresholds().unwrap();
        assert_eq!(thresholds.elevated, 800.0);
        assert_eq!(thresholds.high, 1200.0);
    }

    #[test]
    fn test_thresholds_rejects_inverted_bands() {
        let config = Config {
            elevated_threshold: Some(1000.0),
            high_threshold: Some(900.0),
            ..Default::default()
        };
        let err = config.thresholds().unwrap_err();
        assert!(err.to_string().contains("Invalid thresholds"));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config {
            base_url: Some("http://localhost:8080".to_string()),
            format: Some("json".to_string()),
            no_color: true,
            poll_interval_secs: Some(5),
            ..Default::default()
        };
        config.save_to(&path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("base_url = \"http://localhost:8080\""));

        assert_eq!(Config::load_from(&path), config);
    }

    #[test]
    fn test_load_missing_or_invalid_returns_default() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        assert_eq!(Config::load_from(&missing), Config::default());

        let invalid = dir.path().join("invalid.toml");
        fs::write(&invalid, "base_url = [").unwrap();
        assert_eq!(Config::load_from(&invalid), Config::default());
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let config: Config = toml::from_str("base_url = \"http://x\"\nlegacy = 1\n").unwrap();
        assert_eq!(config.base_url.as_deref(), Some("http://x"));
    }
}
