use async_trait::async_trait;
use bytes::Bytes;

use common::manifest::{CreateDeploymentRequest, DeploymentResult};

use super::error::DeployError;
use crate::blob::BlobUploader;
use crate::http_server::api::client::ApiClient;
use crate::http_server::api::upload_file::UploadFileRequest;

/// The network side of a deploy run.
#[async_trait]
pub trait DeployTransport: Send + Sync {
    /// Store a media file in the blob store and return its public URL
    async fn upload_media(&self, pathname: &str, content: Bytes) -> Result<String, DeployError>;

    /// Store a text file in the content-addressed file store under `digest`
    async fn upload_file(&self, digest: &str, content: Bytes) -> Result<(), DeployError>;

    async fn create_deployment(
        &self,
        request: CreateDeploymentRequest,
    ) -> Result<DeploymentResult, DeployError>;
}

/// Talks to the proxy server and the blob store over HTTP
#[derive(Debug, Clone)]
pub struct HttpTransport {
    api: ApiClient,
    blobs: BlobUploader,
}

impl HttpTransport {
    pub fn new(api: ApiClient, blobs: BlobUploader) -> Self {
        Self { api, blobs }
    }
}

#[async_trait]
impl DeployTransport for HttpTransport {
    async fn upload_media(&self, pathname: &str, content: Bytes) -> Result<String, DeployError> {
        let blob = self
            .blobs
            .upload(pathname, content)
            .await
            .map_err(|source| DeployError::Blob {
                path: pathname.to_string(),
                source,
            })?;
        Ok(blob.url)
    }

    async fn upload_file(&self, digest: &str, content: Bytes) -> Result<(), DeployError> {
        let request = UploadFileRequest {
            digest: digest.to_string(),
            body: content,
        };
        let (status, body) = self.api.call_raw(request).await?;
        if !status.is_success() {
            return Err(DeployError::Upload {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }

    async fn create_deployment(
        &self,
        request: CreateDeploymentRequest,
    ) -> Result<DeploymentResult, DeployError> {
        let (status, body) = self.api.call_raw(request).await?;
        if !status.is_success() {
            return Err(DeployError::Create {
                status: status.as_u16(),
                body,
            });
        }
        parse_deployment(&body)
    }
}

/// Parse a deployment response; an empty body reads as `{}`
pub fn parse_deployment(body: &str) -> Result<DeploymentResult, DeployError> {
    if body.trim().is_empty() {
        return Ok(DeploymentResult::default());
    }
    Ok(serde_json::from_str(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_deployment() {
        let result = parse_deployment(r#"{"url":"demo-abc.vercel.app","id":"dpl_1"}"#).unwrap();
        assert_eq!(result.display_url().as_deref(), Some("https://demo-abc.vercel.app"));
        assert_eq!(result.extra["id"], "dpl_1");

        assert_eq!(parse_deployment("").unwrap().url, None);
        assert!(matches!(
            parse_deployment("<html>"),
            Err(DeployError::InvalidResponse(_))
        ));
    }
}
