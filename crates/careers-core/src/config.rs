//! Application configuration management.
//!
//! Two layers:
//! - `Config`: user preferences saved at `~/.config/careers-portal/config.json`
//!   (API address override, last email used to log in, session backend)
//! - `ClientConfig`: the resolved settings every HTTP client is built from.
//!   The base address comes from `CAREERS_API_URL`, then the saved config,
//!   then `http://localhost:5000`.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::auth::LOGIN_PATH;

/// Application name used for config/data directory paths
pub const APP_NAME: &str = "careers-portal";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding the API base address
pub const API_URL_ENV: &str = "CAREERS_API_URL";

/// Environment variable overriding the upload base address
pub const UPLOAD_URL_ENV: &str = "CAREERS_UPLOAD_URL";

/// Base address used when nothing else is configured
pub const DEFAULT_API_URL: &str = "http://localhost:5000";

/// Where the session credential is persisted between runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SessionBackend {
    #[default]
    File,
    Keyring,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub api_url: Option<String>,
    pub last_email: Option<String>,
    #[serde(default)]
    pub session_backend: SessionBackend,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            Ok(serde_json::from_str(&contents).context("Failed to parse config file")?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory holding the file-backed session
    pub fn data_dir(&self) -> Result<PathBuf> {
        let data_dir = dirs::data_local_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }

    /// Resolve the client settings, reading the environment once.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::resolve(
            std::env::var(API_URL_ENV).ok(),
            self.api_url.clone(),
            std::env::var(UPLOAD_URL_ENV).ok(),
        )
    }
}

/// Settings shared by every client the factory builds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub upload_url: String,
    pub login_path: String,
    /// No timeout unless set; calls wait on the transport's own default.
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = normalize_base(&base_url.into());
        Self {
            upload_url: format!("{}/uploads", base_url),
            base_url,
            login_path: LOGIN_PATH.to_string(),
            timeout: None,
        }
    }

    /// Pick the base address from environment, then saved config, then the default.
    pub fn resolve(
        env_url: Option<String>,
        saved_url: Option<String>,
        env_upload_url: Option<String>,
    ) -> Self {
        let base = [env_url, saved_url]
            .into_iter()
            .flatten()
            .find(|u| !u.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let mut config = Self::new(base);
        if let Some(upload) = env_upload_url.filter(|u| !u.trim().is_empty()) {
            config.upload_url = normalize_base(&upload);
        }
        config
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    /// Join an API path (`/api/...`) onto the base address
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Absolute link for a file the server stored under its upload directory.
    /// Values that are already absolute are returned as-is.
    pub fn upload_link(&self, stored: &str) -> String {
        if stored.starts_with("http://") || stored.starts_with("https://") {
            stored.to_string()
        } else {
            let name = stored.trim_start_matches('/').trim_start_matches("uploads/");
            format!("{}/{}", self.upload_url, name)
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

fn normalize_base(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
