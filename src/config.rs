use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;
use url::Url;

use crate::error::{ConfigError, StorageError};
use crate::session::{FileSessionStore, KeyringSessionStore, SessionStore};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";
/// Overrides `api_base_url` from any config file.
pub const API_URL_ENV: &str = "FRAUDFINDER_API_URL";
const LOCAL_CONFIG_FILE: &str = "fraudfinder.toml";

/// Where the bearer token is persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenStorage {
    #[default]
    File,
    Keychain,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_base_url: String,
    pub token_storage: TokenStorage,
    /// Directory for persisted session files. Defaults to `<data_dir>/fraudfinder`.
    pub session_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            token_storage: TokenStorage::File,
            session_dir: None,
        }
    }
}

impl AppConfig {
    /// Load from the first location that exists:
    /// 1. ./fraudfinder.toml
    /// 2. <config_dir>/fraudfinder/config.toml
    /// 3. built-in defaults
    ///
    /// `FRAUDFINDER_API_URL` then overrides the base URL.
    pub fn load_default() -> Result<Self, ConfigError> {
        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        let user = dirs::config_dir().map(|d| d.join("fraudfinder").join("config.toml"));

        let config = match [Some(local), user].into_iter().flatten().find(|p| p.exists()) {
            Some(path) => Self::load_from(&path)?,
            None => Self::default(),
        };

        let config = config.with_api_url_override(std::env::var(API_URL_ENV).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn with_api_url_override(mut self, url: Option<String>) -> Self {
        if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
            self.api_base_url = url.trim().to_string();
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidBaseUrl {
            url: self.api_base_url.clone(),
            reason,
        };
        let url = Url::parse(&self.api_base_url).map_err(|e| invalid(e.to_string()))?;
        match url.scheme() {
            "http" | "https" => Ok(()),
            other => Err(invalid(format!("unsupported scheme '{}'", other))),
        }
    }

    pub fn session_dir(&self) -> Result<PathBuf, StorageError> {
        match &self.session_dir {
            Some(dir) => Ok(dir.clone()),
            None => dirs::data_dir()
                .map(|d| d.join("fraudfinder"))
                .ok_or(StorageError::NoDataDir),
        }
    }

    pub fn open_session_store(&self) -> Result<Box<dyn SessionStore>, StorageError> {
        let dir = self.session_dir()?;
        Ok(match self.token_storage {
            TokenStorage::File => Box::new(FileSessionStore::in_dir(&dir)),
            TokenStorage::Keychain => Box::new(KeyringSessionStore::new(&dir)),
        })
    }
}
