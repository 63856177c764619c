use axum::body::Bytes;
use axum::extract::State;
use axum::response::Response;
use reqwest::{Client, RequestBuilder, Url};
use serde_json::Value;

use common::manifest::{
    CreateDeploymentRequest, DeploymentResult, UpstreamDeployment, UpstreamFile,
};

use super::client::{ApiError, ApiRequest};
use super::error::ProxyError;
use super::{parse_json_body, relay};
use crate::ServiceState;

pub const PATH: &str = "/api/create-deployment";

pub async fn handler(
    State(state): State<ServiceState>,
    body: Bytes,
) -> Result<Response, ProxyError> {
    let token = state.api_token().ok_or(ProxyError::MissingToken)?;
    let value = parse_json_body(&body)?;
    let payload = normalize(&value)?;

    tracing::info!(
        name = %payload.name,
        files = payload.files.len(),
        "creating deployment"
    );
    let upstream = state
        .hosting()
        .create_deployment(token, &payload)
        .await
        .map_err(|e| ProxyError::UpstreamRequestFailed(e.to_string()))?;

    Ok(relay(upstream))
}

/// Validate an untrusted request body and build the upstream payload.
///
/// The name is trimmed and must be non-empty; `files` must be a non-empty
/// array whose entries are coerced into manifest entries.
pub fn normalize(value: &Value) -> Result<UpstreamDeployment, ProxyError> {
    let name = value
        .get("name")
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or_default();

    let files: &[Value] = match value.get("files") {
        Some(Value::Array(files)) => files.as_slice(),
        _ => &[],
    };

    if name.is_empty() || files.is_empty() {
        return Err(ProxyError::MissingNameOrFiles);
    }

    let files = files.iter().map(UpstreamFile::from_value).collect();
    Ok(UpstreamDeployment::new(name.to_string(), files))
}

// Client implementation - submits the manifest
impl ApiRequest for CreateDeploymentRequest {
    type Response = DeploymentResult;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join(PATH)?;
        Ok(client.post(full_url).json(&self))
    }
}
