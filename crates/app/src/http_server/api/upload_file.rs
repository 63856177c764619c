use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Response;
use reqwest::{Client, RequestBuilder, Url};
use serde_json::Value;

use super::client::{ApiError, ApiRequest};
use super::error::ProxyError;
use super::relay;
use crate::hosting::DIGEST_HEADER;
use crate::ServiceState;

pub const PATH: &str = "/api/upload-file";

pub async fn handler(
    State(state): State<ServiceState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ProxyError> {
    let token = state.api_token().ok_or(ProxyError::MissingToken)?;

    let digest = headers
        .get(DIGEST_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .ok_or(ProxyError::MissingDigest)?;

    tracing::info!(digest, size = body.len(), "uploading file");
    let upstream = state
        .hosting()
        .upload_file(token, digest, body)
        .await
        .map_err(|e| ProxyError::UpstreamRequestFailed(e.to_string()))?;

    Ok(relay(upstream))
}

/// Raw file bytes and the SHA-1 they are stored under
#[derive(Debug, Clone)]
pub struct UploadFileRequest {
    pub digest: String,
    pub body: Bytes,
}

// Client implementation - posts the raw bytes with their digest header
impl ApiRequest for UploadFileRequest {
    type Response = Value;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join(PATH)?;
        Ok(client
            .post(full_url)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .header(DIGEST_HEADER, self.digest)
            .body(self.body))
    }
}
