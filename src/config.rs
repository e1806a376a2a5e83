use anyhow::Result;
use fs_err::read_to_string;
use serde::Deserialize;
use std::path::Path;

use super::records::DEFAULT_API_URL;

/// Run configuration. Every field has a compiled-in default so the binary
/// works without a config file; a TOML file may override any subset.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_url: String,
    pub schedule_dir: String,
    pub manifest_path: String,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            api_url: DEFAULT_API_URL.to_string(),
            schedule_dir: "train_data".to_string(),
            manifest_path: "new_train_img_data.json".to_string(),
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Config> {
        if !Path::new(path).exists() {
            return Ok(Config::default());
        }
        let raw = read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.schedule_dir, "train_data");
        assert_eq!(config.manifest_path, "new_train_img_data.json");
    }

    #[test]
    fn test_partial_override() {
        let config: Config = toml::from_str("schedule_dir = \"/tmp/schedules\"").unwrap();
        assert_eq!(config.schedule_dir, "/tmp/schedules");
        assert_eq!(config.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let config = Config::load("does/not/exist.toml").unwrap();
        assert_eq!(config.manifest_path, "new_train_img_data.json");
    }
}
