use std::{fs, path::PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

pub const APP_NAME: &str = "sitepush";
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Hosting provider REST API
pub const DEFAULT_API_BASE_URL: &str = "https://api.vercel.com";

/// Upper bound on a single blob upload: 5 TiB
pub const DEFAULT_MAX_BLOB_SIZE_BYTES: u64 = 5 * 1024 * 1024 * 1024 * 1024;

/// Non-secret server settings, loaded from `config.toml`.
///
/// Credentials never live here; see [`crate::service_config::Credentials`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Port the proxy server listens on
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,
    /// Base URL of the hosting provider API
    #[serde(default = "default_api_base_url")]
    pub api_base_url: Url,
    /// Size ceiling written into every blob client token
    #[serde(default = "default_max_blob_size_bytes")]
    pub max_blob_size_bytes: u64,
    /// Default log level for the server (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_listen_port() -> u16 {
    3000
}

fn default_api_base_url() -> Url {
    Url::parse(DEFAULT_API_BASE_URL).expect("hardcoded URL must parse")
}

fn default_max_blob_size_bytes() -> u64 {
    DEFAULT_MAX_BLOB_SIZE_BYTES
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            listen_port: default_listen_port(),
            api_base_url: default_api_base_url(),
            max_blob_size_bytes: default_max_blob_size_bytes(),
            log_level: default_log_level(),
        }
    }
}

impl AppConfig {
    /// Resolve the config file path (custom or default ~/.sitepush/config.toml)
    pub fn path(custom_path: Option<PathBuf>) -> Result<PathBuf, StateError> {
        if let Some(path) = custom_path {
            return Ok(path);
        }

        let home = dirs::home_dir().ok_or(StateError::NoHomeDirectory)?;
        Ok(home.join(format!(".{}", APP_NAME)).join(CONFIG_FILE_NAME))
    }

    /// Load the config file, falling back to defaults when it does not exist
    pub fn load(custom_path: Option<PathBuf>) -> Result<Self, StateError> {
        let path = match Self::path(custom_path) {
            Ok(path) => path,
            Err(StateError::NoHomeDirectory) => return Ok(Self::default()),
            Err(e) => return Err(e),
        };

        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let config_toml = fs::read_to_string(&path)?;
        let config: AppConfig = toml::from_str(&config_toml)?;
        Ok(config)
    }

    pub fn log_level(&self) -> tracing::Level {
        self.log_level.parse().unwrap_or(tracing::Level::INFO)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("no home directory found")]
    NoHomeDirectory,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
}
