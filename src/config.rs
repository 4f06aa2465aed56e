//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.community-assess.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name, looked up in the current directory.
pub const CONFIG_FILE: &str = ".community-assess.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Store settings.
    #[serde(default)]
    pub store: StoreConfig,

    /// Map service settings.
    #[serde(default)]
    pub amap: AmapConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Working file holding the draft being edited.
    #[serde(default = "default_draft")]
    pub draft: PathBuf,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            draft: default_draft(),
        }
    }
}

fn default_draft() -> PathBuf {
    PathBuf::from("draft.json")
}

/// Saved assessment store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory holding one JSON file per saved assessment.
    #[serde(default = "default_store_dir")]
    pub dir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            dir: default_store_dir(),
        }
    }
}

fn default_store_dir() -> PathBuf {
    PathBuf::from(".assessments")
}

/// AMap web service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmapConfig {
    /// Web service key. Usually supplied through `AMAP_KEY`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    /// API base URL.
    #[serde(default = "default_amap_url")]
    pub base_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Results requested per search.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for AmapConfig {
    fn default() -> Self {
        Self {
            key: None,
            base_url: default_amap_url(),
            timeout_seconds: default_timeout(),
            page_size: default_page_size(),
        }
    }
}

fn default_amap_url() -> String {
    "https://restapi.amap.com".to_string()
}

fn default_timeout() -> u64 {
    10
}

fn default_page_size() -> usize {
    10
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// List every indicator under its category in Markdown output.
    #[serde(default = "default_true")]
    pub include_indicators: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            include_indicators: true,
        }
    }
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref dir) = args.store_dir {
            self.store.dir = dir.clone();
        }
        if let Some(ref draft) = args.draft {
            self.general.draft = draft.clone();
        }
        if let Some(ref key) = args.amap_key {
            self.amap.key = Some(key.clone());
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.store.dir, PathBuf::from(".assessments"));
        assert_eq!(config.general.draft, PathBuf::from("draft.json"));
        assert_eq!(config.amap.base_url, "https://restapi.amap.com");
        assert!(config.amap.key.is_none());
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
draft = "work/current.json"

[store]
dir = "/var/lib/assessments"

[amap]
key = "abc123"
page_size = 20
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.draft, PathBuf::from("work/current.json"));
        assert_eq!(config.store.dir, PathBuf::from("/var/lib/assessments"));
        assert_eq!(config.amap.key.as_deref(), Some("abc123"));
        assert_eq!(config.amap.page_size, 20);
        assert_eq!(config.amap.timeout_seconds, 10);
        assert!(config.report.include_indicators);
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[store]"));
        assert!(toml_str.contains("[amap]"));
        assert!(!toml_str.contains("key ="));
        assert!(!toml_str.contains("verbose"));
    }
}
