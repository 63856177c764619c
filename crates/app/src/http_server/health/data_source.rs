use std::fmt::Debug;
use std::ops::Deref;
use std::sync::Arc;

use axum::async_trait;
use axum::extract::FromRequestParts;
use http::request::Parts;

use crate::service_config::{ENV_BLOB_READ_WRITE_TOKEN, ENV_VERCEL_TOKEN};
use crate::ServiceState;

#[async_trait]
pub trait DataSource {
    /// Check that everything the proxies depend on is configured
    async fn is_ready(&self) -> Result<(), DataSourceError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DataSourceError {
    /// Names of the environment variables that are unset or unusable
    #[error("missing credentials: {}", .0.join(", "))]
    MissingCredentials(Vec<&'static str>),
}

pub type DynDataSource = Arc<dyn DataSource + Send + Sync>;

pub struct StateDataSource(DynDataSource);

impl Debug for StateDataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateDataSource").finish()
    }
}

impl StateDataSource {
    #[cfg(test)]
    pub fn new(dds: DynDataSource) -> Self {
        Self(dds)
    }
}

impl Deref for StateDataSource {
    type Target = DynDataSource;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Ready once the hosting token and a well-formed blob token are present
struct CredentialSource {
    state: ServiceState,
}

#[async_trait]
impl DataSource for CredentialSource {
    async fn is_ready(&self) -> Result<(), DataSourceError> {
        let mut missing = Vec::new();
        if self.state.api_token().is_none() {
            missing.push(ENV_VERCEL_TOKEN);
        }
        if let Err(e) = self.state.blob_token() {
            tracing::debug!("blob token unusable: {}", e);
            missing.push(ENV_BLOB_READ_WRITE_TOKEN);
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(DataSourceError::MissingCredentials(missing))
        }
    }
}

#[async_trait]
impl FromRequestParts<ServiceState> for StateDataSource {
    type Rejection = ();

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &ServiceState,
    ) -> Result<Self, Self::Rejection> {
        Ok(StateDataSource(Arc::new(CredentialSource {
            state: state.clone(),
        })))
    }
}
