use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;

use url::Url;

use crate::state::AppConfig;

pub const ENV_VERCEL_TOKEN: &str = "VERCEL_TOKEN";
pub const ENV_VERCEL_TEAM_ID: &str = "VERCEL_TEAM_ID";
pub const ENV_VERCEL_TEAM_SLUG: &str = "VERCEL_TEAM_SLUG";
pub const ENV_BLOB_READ_WRITE_TOKEN: &str = "BLOB_READ_WRITE_TOKEN";

/// Secrets and team scoping, read from the environment.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// Bearer token for the hosting provider API
    pub api_token: Option<String>,
    /// Scopes upstream calls to a team (`teamId` query parameter)
    pub team_id: Option<String>,
    /// Scopes upstream calls to a team (`slug` query parameter)
    pub team_slug: Option<String>,
    /// Read-write token of the blob store
    pub blob_read_write_token: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_token", &self.api_token.as_ref().map(|_| "<redacted>"))
            .field("team_id", &self.team_id)
            .field("team_slug", &self.team_slug)
            .field(
                "blob_read_write_token",
                &self.blob_read_write_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

impl Credentials {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());
        Self {
            api_token: get(ENV_VERCEL_TOKEN),
            team_id: get(ENV_VERCEL_TEAM_ID),
            team_slug: get(ENV_VERCEL_TEAM_SLUG),
            blob_read_write_token: get(ENV_BLOB_READ_WRITE_TOKEN),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    // http server configuration
    /// address for the proxy server to listen on
    pub listen_addr: SocketAddr,

    // upstream configuration
    /// hosting provider API base URL
    pub api_base_url: Url,
    /// size ceiling for blob client tokens
    pub max_blob_size_bytes: u64,
    pub credentials: Credentials,

    // logging
    pub log_level: tracing::Level,
    /// Directory for log files (optional, logs to stdout only if not set)
    pub log_dir: Option<PathBuf>,
}

impl Config {
    pub fn new(app: &AppConfig, credentials: Credentials) -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], app.listen_port)),
            api_base_url: app.api_base_url.clone(),
            max_blob_size_bytes: app.max_blob_size_bytes,
            credentials,
            log_level: app.log_level(),
            log_dir: None,
        }
    }
}
