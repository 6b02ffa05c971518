//! Config command implementation.

use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::cli::{ConfigAction, ConfigKey, OutputFormat};
use crate::config::Config;

pub fn cmd_config(action: ConfigAction, path: &Path, quiet: bool) -> Result<()> {
    match action {
        ConfigAction::Path => {
            println!("{}", path.display());
        }
        ConfigAction::Show => {
            let config = Config::load_from(path);
            if !quiet {
                println!("# {}", path.display());
            }
            let shown = Config {
                maps_api_key: config.maps_api_key.as_deref().map(mask_secret),
                ..config
            };
            let content = toml::to_string_pretty(&shown).context("Failed to serialize config")?;
            if shown == Config::default() {
                if !quiet {
                    println!("(no settings; all values use their defaults)");
                }
            } else {
                print!("{}", content);
            }
        }
        ConfigAction::Get { key } => {
            let config = Config::load_from(path);
            match get_value(&config, key) {
                Some(value) => println!("{}", value),
                None => {
                    if !quiet {
                        eprintln!("(not set)");
                    }
                }
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load_from(path);
            set_value(&mut config, key, &value)?;
            config.save_to(path)?;
            if !quiet {
                println!("Set {} = {}", key_name(key), shown_value(key, &value));
            }
        }
        ConfigAction::Unset { key } => {
            let mut config = Config::load_from(path);
            unset_value(&mut config, key);
            config.save_to(path)?;
            if !quiet {
                println!("Unset {}", key_name(key));
            }
        }
        ConfigAction::Init => {
            if path.exists() {
                bail!(
                    "Config already exists at {}\nUse 'safeair config show' to view it.",
                    path.display()
                );
            }
            Config::default().save_to(path)?;
            if !quiet {
                println!("Created {}", path.display());
            }
        }
    }
    Ok(())
}

fn key_name(key: ConfigKey) -> &'static str {
    match key {
        ConfigKey::BaseUrl => "base-url",
        ConfigKey::MapsApiKey => "maps-api-key",
        ConfigKey::Format => "format",
        ConfigKey::NoColor => "no-color",
        ConfigKey::PollInterval => "poll-interval",
        ConfigKey::ElevatedThreshold => "elevated-threshold",
        ConfigKey::HighThreshold => "high-threshold",
    }
}

fn get_value(config: &Config, key: ConfigKey) -> Option<String> {
    match key {
        ConfigKey::BaseUrl => config.base_url.clone(),
        ConfigKey::MapsApiKey => config.maps_api_key.as_deref().map(mask_secret),
        ConfigKey::Format => config.format.clone(),
        ConfigKey::NoColor => Some(config.no_color.to_string()),
        ConfigKey::PollInterval => config.poll_interval_secs.map(|s| s.to_string()),
        ConfigKey::ElevatedThreshold => config.elevated_threshold.map(|v| v.to_string()),
        ConfigKey::HighThreshold => config.high_threshold.map(|v| v.to_string()),
    }
}

fn set_value(config: &mut Config, key: ConfigKey, value: &str) -> Result<()> {
    let value = value.trim();
    match key {
        ConfigKey::BaseUrl => {
            safeair_core::ApiClient::new(value)
                .with_context(|| format!("Invalid backend URL: {}", value))?;
            config.base_url = Some(value.trim_end_matches('/').to_string());
        }
        ConfigKey::MapsApiKey => {
            if value.is_empty() {
                bail!("API key must not be empty. Use 'safeair config unset maps-api-key' instead");
            }
            config.maps_api_key = Some(value.to_string());
        }
        ConfigKey::Format => {
            let format = OutputFormat::from_config(value).with_context(|| {
                format!("Invalid format '{}'. Valid values: text, json, csv", value)
            })?;
            config.format = Some(format_name(format).to_string());
        }
        ConfigKey::NoColor => {
            config.no_color = parse_bool(value)?;
        }
        ConfigKey::PollInterval => {
            let secs: u64 = value
                .parse()
                .ok()
                .filter(|s| *s > 0)
                .with_context(|| {
                    format!("Invalid interval '{}'. Use a whole number of seconds > 0", value)
                })?;
            config.poll_interval_secs = Some(secs);
        }
        ConfigKey::ElevatedThreshold | ConfigKey::HighThreshold => {
            let ppm: f64 = value
                .parse()
                .with_context(|| format!("Invalid threshold '{}'. Use a number of ppm", value))?;
            let mut updated = config.clone();
            if key == ConfigKey::ElevatedThreshold {
                updated.elevated_threshold = Some(ppm);
            } else {
                updated.high_threshold = Some(ppm);
            }
            updated.thresholds()?;
            *config = updated;
        }
    }
    Ok(())
}

fn unset_value(config: &mut Config, key: ConfigKey) {
    match key {
        ConfigKey::BaseUrl => config.base_url = None,
        ConfigKey::MapsApiKey => config.maps_api_key = None,
        ConfigKey::Format => config.format = None,
        ConfigKey::NoColor => config.no_color = false,
        ConfigKey::PollInterval => config.poll_interval_secs = None,
        ConfigKey::ElevatedThreshold => config.elevated_threshold = None,
        ConfigKey::HighThreshold => config.high_threshold = None,
    }
}

fn format_name(format: OutputFormat) -> &'static str {
    match format {
        OutputFormat::Text => "text",
        OutputFormat::Json => "json",
        OutputFormat::Csv => "csv",
    }
}

fn parse_bool(s: &str) -> Result<bool> {
    match s.to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => bail!(
            "Invalid boolean value '{}'. Use: true/false, yes/no, on/off, 1/0",
            s
        ),
    }
}

fn shown_value(key: ConfigKey, value: &str) -> String {
    if key == ConfigKey::MapsApiKey {
        mask_secret(value.trim())
    } else {
        value.trim().to_string()
    }
}

/// Keep the last four characters of a secret.
fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{}", tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get_values() {
        let mut config = Config::default();
        set_value(&mut config, ConfigKey::BaseUrl, "http://localhost:8080/").unwrap();
        set_value(&mut config, ConfigKey::Format, "JSON").unwrap();
        set_value(&mut config, ConfigKey::NoColor, "yes").unwrap();
        set_value(&mut config, ConfigKey::PollInterval, "10").unwrap();

        assert_eq!(
            get_value(&config, ConfigKey::BaseUrl).as_deref(),
            Some("http://localhost:8080")
        );
        assert_eq!(get_value(&config, ConfigKey::Format).as_deref(), Some("json"));
        assert_eq!(get_value(&config, ConfigKey::NoColor).as_deref(), Some("true"));
        assert_eq!(get_value(&config, ConfigKey::PollInterval).as_deref(), Some("10"));
        assert_eq!(get_value(&config, ConfigKey::HighThreshold), None);
    }

    #[test]
    fn test_set_rejects_invalid_values() {
        let mut config = Config::default();
        assert!(set_value(&mut config, ConfigKey::BaseUrl, "ftp://x").is_err());
        assert!(set_value(&mut config, ConfigKey::Format, "xml").is_err());
        assert!(set_value(&mut config, ConfigKey::NoColor, "maybe").is_err());
        assert!(set_value(&mut config, ConfigKey::PollInterval, "0").is_err());
        assert!(set_value(&mut config, ConfigKey::HighThreshold, "lots").is_err());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_thresholds_must_stay_ordered() {
        let mut config = Config::default();
        // Default high band starts at 1000.
        let err = set_value(&mut config, ConfigKey::ElevatedThreshold, "1200").unwrap_err();
        assert!(err.to_string().contains("Invalid thresholds"));
        assert_eq!(config.elevated_threshold, None);

        set_value(&mut config, ConfigKey::HighThreshold, "1500").unwrap();
        set_value(&mut config, ConfigKey::ElevatedThreshold, "1200").unwrap();
        assert_eq!(config.thresholds().unwrap().elevated, 1200.0);
    }

    #[test]
    fn test_unset_value() {
        let mut config = Config {
            base_url: Some("http://x".to_string()),
            no_color: true,
            ..Default::default()
        };
        unset_value(&mut config, ConfigKey::BaseUrl);
        unset_value(&mut config, ConfigKey::NoColor);
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_api_key_is_masked() {
        assert_eq!(mask_secret("AIzaSyExample1234"), "****1234");
        assert_eq!(mask_secret("abc"), "****");
        let config = Config {
            maps_api_key: Some("secret-key-9876".to_string()),
            ..Default::default()
        };
        assert_eq!(
            get_value(&config, ConfigKey::MapsApiKey).as_deref(),
            Some("****9876")
        );
    }

    #[test]
    fn test_set_unset_round_trip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        cmd_config(
            ConfigAction::Set {
                key: ConfigKey::BaseUrl,
                value: "http://localhost:8080".to_string(),
            },
            &path,
            true,
        )
        .unwrap();
        assert_eq!(
            Config::load_from(&path).base_url.as_deref(),
            Some("http://localhost:8080")
        );

        cmd_config(ConfigAction::Unset { key: ConfigKey::BaseUrl }, &path, true).unwrap();
        assert_eq!(Config::load_from(&path), Config::default());

        // Init refuses to overwrite.
        assert!(cmd_config(ConfigAction::Init, &path, true).is_err());
    }
}
