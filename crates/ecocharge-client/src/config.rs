//! Client configuration, persisted as `config.json` in the data directory.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use validator::{Validate, ValidationError};

use crate::error::ClientError;

/// Hosted EcoCharge API.
pub const DEFAULT_API_URL: &str = "https://my-node-api-j9ua.onrender.com";

const DATA_DIR: &str = ".ecocharge";
const CONFIG_FILE: &str = "config.json";

/// Configuration for the EcoCharge client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct ClientConfig {
    /// Base URL of the REST API.
    #[validate(custom(function = "http_url"))]
    pub base_url: String,
    /// Base URL of the change feed; defaults to `{base_url}/api/stream`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "http_url"))]
    pub feed_url: Option<String>,
    /// Request timeout in seconds.
    #[validate(range(min = 1_u64, max = 600_u64))]
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Directory holding `config.json` and `session.json`.
    #[serde(skip)]
    pub data_dir: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            feed_url: None,
            timeout_secs: default_timeout_secs(),
            data_dir: default_data_dir().unwrap_or_else(|_| PathBuf::from(DATA_DIR)),
        }
    }
}

const fn default_timeout_secs() -> u64 {
    30
}

fn http_url(value: &str) -> Result<(), ValidationError> {
    match url::Url::parse(value) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(()),
        _ => Err(ValidationError::new("url")
            .with_message(std::borrow::Cow::Borrowed("Must be an http(s) URL"))),
    }
}

/// `~/.ecocharge`, created if missing.
pub fn default_data_dir() -> Result<PathBuf, ClientError> {
    let home = dirs::home_dir()
        .ok_or_else(|| ClientError::Config("Cannot get home directory".to_string()))?;
    Ok(home.join(DATA_DIR))
}

impl ClientConfig {
    /// Load `config.json` from `data_dir`, falling back to defaults when absent.
    pub fn load(data_dir: &Path) -> Result<Self, ClientError> {
        let path = data_dir.join(CONFIG_FILE);
        let mut config = if path.exists() {
            let content = fs::read_to_string(&path)
                .map_err(|e| ClientError::Config(format!("Failed to read {}: {}", path.display(), e)))?;
            serde_json::from_str::<Self>(&content)
                .map_err(|e| ClientError::Config(format!("Failed to parse {}: {}", path.display(), e)))?
        } else {
            Self::default()
        };
        config.data_dir = data_dir.to_path_buf();
        config.normalize();
        config.check()?;
        Ok(config)
    }

    /// Atomically write `config.json`.
    pub fn save(&self) -> Result<(), ClientError> {
        fs::create_dir_all(&self.data_dir)
            .map_err(|e| ClientError::Config(format!("Failed to create data directory: {}", e)))?;
        let path = self.data_dir.join(CONFIG_FILE);
        let temp_path = self.data_dir.join(format!("{}.tmp", CONFIG_FILE));

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ClientError::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(&temp_path, content)
            .map_err(|e| ClientError::Config(format!("Failed to write config: {}", e)))?;
        fs::rename(&temp_path, &path)
            .map_err(|e| ClientError::Config(format!("Failed to save config: {}", e)))
    }

    /// Trim trailing slashes so paths can be appended with `format!`.
    pub fn normalize(&mut self) {
        self.base_url = self.base_url.trim().trim_end_matches('/').to_string();
        if let Some(feed) = self.feed_url.as_mut() {
            *feed = feed.trim().trim_end_matches('/').to_string();
        }
    }

    /// Validate URLs and the timeout.
    pub fn check(&self) -> Result<(), ClientError> {
        ecocharge_types::validation::check(self)
            .map_err(|e| ClientError::Config(format!("{}: {}", e.field, e.message)))
    }

    /// Base URL of the change feed.
    pub fn feed_base(&self) -> String {
        self.feed_url.clone().unwrap_or_else(|| format!("{}/api/stream", self.base_url))
    }

    /// Path of the session file inside the data directory.
    pub fn session_path(&self) -> PathBuf {
        self.data_dir.join("session.json")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ClientConfig::load(dir.path()).unwrap();

        assert_eq!(config.base_url, DEFAULT_API_URL);
        assert_eq!(config.feed_base(), format!("{}/api/stream", DEFAULT_API_URL));
        assert_eq!(config.data_dir, dir.path());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let config = ClientConfig {
            base_url: "http://localhost:5000/".to_string(),
            feed_url: Some("http://localhost:5001/events".to_string()),
            timeout_secs: 10,
            data_dir: dir.path().to_path_buf(),
        };
        config.save().unwrap();

        let loaded = ClientConfig::load(dir.path()).unwrap();
        assert_eq!(loaded.base_url, "http://localhost:5000");
        assert_eq!(loaded.feed_base(), "http://localhost:5001/events");
        assert_eq!(loaded.timeout_secs, 10);
    }

    #[test]
    fn test_rejects_non_http_url() {
        let config = ClientConfig { base_url: "ftp://example.com".to_string(), ..Default::default() };
        assert!(matches!(config.check(), Err(ClientError::Config(_))));
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let config = ClientConfig { timeout_secs: 0, ..Default::default() };
        assert!(config.check().is_err());
    }
}
