//! Client for the hosting provider's REST API.
//!
//! Only two calls are made: storing a file in the content-addressed file
//! store (`/v2/files`) and creating a deployment (`/v13/deployments`).
//! Responses are not interpreted; status and body are handed back so the
//! proxies can relay them verbatim.

use bytes::Bytes;
use reqwest::header::{AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use url::Url;

use common::manifest::UpstreamDeployment;

use crate::service_config::Credentials;

/// Header carrying the SHA-1 of an uploaded file
pub const DIGEST_HEADER: &str = "x-vercel-digest";

const FILES_PATH: &str = "v2/files";
const DEPLOYMENTS_PATH: &str = "v13/deployments";

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("upstream request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("invalid upstream URL: {0}")]
    Url(#[from] url::ParseError),
}

/// An upstream reply, relayed as is
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

#[derive(Debug, Clone)]
pub struct HostingClient {
    base_url: Url,
    team_id: Option<String>,
    team_slug: Option<String>,
    client: Client,
}

impl HostingClient {
    pub fn new(base_url: Url, credentials: &Credentials) -> Result<Self, UpstreamError> {
        let client = Client::builder().build()?;
        Ok(Self {
            base_url,
            team_id: credentials.team_id.clone(),
            team_slug: credentials.team_slug.clone(),
            client,
        })
    }

    /// `POST /v2/files`: store `body` under its SHA-1 `digest`
    pub async fn upload_file(
        &self,
        token: &str,
        digest: &str,
        body: Bytes,
    ) -> Result<UpstreamResponse, UpstreamError> {
        let url = self.endpoint(FILES_PATH, &[])?;
        tracing::debug!(%url, digest, size = body.len(), "forwarding file upload");

        let response = self
            .client
            .post(url)
            .header(AUTHORIZATION, format!("Bearer {}", token))
            .header(CONTENT_TYPE, "application/octet-stream")
            .header(CONTENT_LENGTH, body.len().to_string())
            .header(DIGEST_HEADER, digest)
            .body(body)
            .send()
            .await?;

        Self::relay(response).await
    }

    /// `POST /v13/deployments`: create a production deployment
    pub async fn create_deployment(
        &self,
        token: &str,
        payload: &UpstreamDeployment,
    ) -> Result<UpstreamResponse, UpstreamError> {
        let url = self.endpoint(DEPLOYMENTS_PATH, &[("skipAutoDetectionConfirmation", "1")])?;
        tracing::debug!(%url, name = %payload.name, files = payload.files.len(), "forwarding deployment");

        let response = self
            .client
            .post(url)
            .header(AUTHORIZATION, format!("Bearer {}", token))
            .json(payload)
            .send()
            .await?;

        Self::relay(response).await
    }

    /// Join `path` onto the base URL and append the fixed query parameters
    /// followed by the optional team scoping.
    fn endpoint(&self, path: &str, fixed: &[(&str, &str)]) -> Result<Url, UpstreamError> {
        let mut base = self.base_url.clone();
        if !base.path().ends_with('/') {
            let with_slash = format!("{}/", base.path());
            base.set_path(&with_slash);
        }
        let mut url = base.join(path)?;

        let mut params: Vec<(&str, &str)> = fixed.to_vec();
        if let Some(team_id) = &self.team_id {
            params.push(("teamId", team_id));
        }
        if let Some(slug) = &self.team_slug {
            params.push(("slug", slug));
        }
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }

        Ok(url)
    }

    async fn relay(response: reqwest::Response) -> Result<UpstreamResponse, UpstreamError> {
        let status = response.status();
        // A body that cannot be read is relayed as empty
        let body = response.bytes().await.unwrap_or_default();
        Ok(UpstreamResponse { status, body })
    }
}
