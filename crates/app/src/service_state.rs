use std::sync::Arc;

use common::blob::{ReadWriteToken, TokenError};

use crate::hosting::{HostingClient, UpstreamError};
use crate::ServiceConfig;

/// Shared, immutable state handed to every request handler.
#[derive(Clone)]
pub struct State(Arc<Inner>);

struct Inner {
    hosting: HostingClient,
    api_token: Option<String>,
    /// Kept as a result so the blob proxy can report why it is unusable
    blob_token: Result<ReadWriteToken, String>,
    max_blob_size_bytes: u64,
}

impl std::fmt::Debug for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("State")
            .field("has_api_token", &self.0.api_token.is_some())
            .field("blob_token", &self.0.blob_token.as_ref().map(|t| t.store_id()))
            .field("max_blob_size_bytes", &self.0.max_blob_size_bytes)
            .finish()
    }
}

impl State {
    pub async fn from_config(config: &ServiceConfig) -> Result<Self, StateSetupError> {
        let credentials = &config.credentials;
        let hosting = HostingClient::new(config.api_base_url.clone(), credentials)?;

        let blob_token = credentials
            .blob_read_write_token
            .as_deref()
            .ok_or(TokenError::Missing)
            .and_then(ReadWriteToken::parse)
            .map_err(|e| e.to_string());

        match &blob_token {
            Ok(token) => tracing::info!(store_id = token.store_id(), "blob store configured"),
            Err(e) => tracing::warn!("blob uploads unavailable: {}", e),
        }
        if credentials.api_token.is_none() {
            tracing::warn!("VERCEL_TOKEN is not set, hosting calls will be rejected");
        }

        Ok(Self(Arc::new(Inner {
            hosting,
            api_token: credentials.api_token.clone(),
            blob_token,
            max_blob_size_bytes: config.max_blob_size_bytes,
        })))
    }

    pub fn hosting(&self) -> &HostingClient {
        &self.0.hosting
    }

    pub fn api_token(&self) -> Option<&str> {
        self.0.api_token.as_deref()
    }

    pub fn blob_token(&self) -> Result<&ReadWriteToken, &str> {
        self.0.blob_token.as_ref().map_err(|e| e.as_str())
    }

    pub fn max_blob_size_bytes(&self) -> u64 {
        self.0.max_blob_size_bytes
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateSetupError {
    #[error("failed to build hosting client: {0}")]
    Hosting(#[from] UpstreamError),
}
