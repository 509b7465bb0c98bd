//! Worker configuration.
//!
//! Holds the cache version tag, the static asset list, the API hostname
//! patterns and the scope URL relative asset paths resolve against.
//! Defaults mirror the deployed StepToDeen worker; an optional override file
//! lives at `~/.config/steptodeen/config.json`.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use reqwest::Url;
use serde::{Deserialize, Serialize};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "steptodeen";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Bumping this is the only way to invalidate everything cached so far.
pub const CACHE_NAME: &str = "steptodeen-v1";

pub const DEFAULT_SCOPE: &str = "http://localhost:8080/";

pub const APP_SHELL: &str = "./index.html";

pub const STATIC_ASSETS: &[&str] = &[
    "./",
    "./index.html",
    "./manifest.json",
    "https://fonts.googleapis.com/css2?family=Amiri+Quran&family=Amiri:ital,wght@0,400;0,700;1,400&family=Noto+Nastaliq+Urdu:wght@400;600;700&display=swap",
    "https://cdnjs.cloudflare.com/ajax/libs/font-awesome/6.5.0/css/all.min.css",
];

/// Hostname substrings of the prayer-time, Quran and Hadith data providers.
pub const API_HOST_PATTERNS: &[&str] = &["aladhan.com", "alquran.cloud", "cdn.jsdelivr.net", "api."];

/// HTTP request timeout in seconds.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub cache_name: String,
    pub scope: String,
    pub static_assets: Vec<String>,
    pub api_host_patterns: Vec<String>,
    pub app_shell: String,
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_name: CACHE_NAME.to_string(),
            scope: DEFAULT_SCOPE.to_string(),
            static_assets: STATIC_ASSETS.iter().map(|s| s.to_string()).collect(),
            api_host_patterns: API_HOST_PATTERNS.iter().map(|s| s.to_string()).collect(),
            app_shell: APP_SHELL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            Self::from_json(&contents)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(contents).context("Failed to parse config")?;
        config.validate()?;
        Ok(config)
    }

    /// Check the scope URL and the cache name.
    ///
    /// The cache name becomes a single directory under the cache root, so it
    /// must be non-empty and free of path separators and `..`.
    pub fn validate(&self) -> Result<()> {
        let name = self.cache_name.as_str();
        if name.is_empty() || name == "." || name.contains(['/', '\\']) || name.contains("..") {
            bail!("Invalid cache name: {:?}", name);
        }
        self.scope_url()?;
        Ok(())
    }

    /// Write this config to the config file, returning its path.
    pub fn save(&self) -> Result<PathBuf> {
        self.validate()?;
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config dir: {}", parent.display()))?;
        }
        std::fs::write(&path, serde_json::to_string_pretty(self)?)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(path)
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Root directory for the on-disk cache buckets
    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    pub fn scope_url(&self) -> Result<Url> {
        Url::parse(&self.scope).with_context(|| format!("Invalid scope URL: {}", self.scope))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_deployed_worker() {
        let config = Config::default();
        assert_eq!(config.cache_name, "steptodeen-v1");
        assert_eq!(config.static_assets.len(), 5);
        assert_eq!(config.static_assets[1], "./index.html");
        assert_eq!(config.api_host_patterns, vec!["aladhan.com", "alquran.cloud", "cdn.jsdelivr.net", "api."]);
        assert!(config.scope_url().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = Config::from_json(r#"{"cache_name": "steptodeen-v2"}"#).unwrap();
        assert_eq!(config.cache_name, "steptodeen-v2");
        assert_eq!(config.app_shell, "./index.html");
        assert_eq!(config.static_assets.len(), 5);
    }

    #[test]
    fn test_cache_name_must_be_single_path_segment() {
        for name in ["", ".", "steptodeen/v2", "steptodeen\\v2", "..", "../steptodeen-v2", "v1..v2"] {
            let json = serde_json::json!({ "cache_name": name }).to_string();
            assert!(Config::from_json(&json).is_err(), "accepted {:?}", name);
        }
        assert!(Config::from_json(r#"{"cache_name": "steptodeen-v2.1"}"#).is_ok());
    }

    #[test]
    fn test_invalid_scope_rejected() {
        assert!(Config::from_json(r#"{"scope": "not a url"}"#).is_err());
    }
}
