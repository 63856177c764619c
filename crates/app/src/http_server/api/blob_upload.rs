use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use reqwest::{Client, RequestBuilder, Url};
use serde_json::Value;

use common::blob::{
    generate_client_token, verify_signature, ClientTokenOptions, GenerateClientTokenPayload,
    HandleUploadBody, HandleUploadResponse, OnUploadCompleted, ReadWriteToken,
    UploadCompletedPayload,
};

use super::client::{ApiError, ApiRequest};
use super::error::ProxyError;
use super::parse_json_body;
use crate::ServiceState;

pub const PATH: &str = "/api/blob-upload";

/// Header carrying the blob store's HMAC of an upload-completed event
pub const SIGNATURE_HEADER: &str = "x-vercel-signature";

pub async fn handler(
    State(state): State<ServiceState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ProxyError> {
    let value = parse_json_body(&body)?;

    // The store token is resolved as part of handling the event, so a
    // missing one is a handling failure like any other
    let key = state
        .blob_token()
        .map_err(|e| ProxyError::BlobHandleUploadFailed(e.to_string()))?;

    let event: HandleUploadBody = serde_json::from_value(value)
        .map_err(|e| ProxyError::BlobHandleUploadFailed(format!("unrecognized event: {}", e)))?;

    let response = match event {
        HandleUploadBody::GenerateClientToken(payload) => {
            issue_client_token(key, payload, state.max_blob_size_bytes())?
        }
        HandleUploadBody::UploadCompleted(payload) => {
            confirm_upload(key, &headers, &body, payload)?
        }
    };

    Ok(Json(response).into_response())
}

fn issue_client_token(
    key: &ReadWriteToken,
    payload: GenerateClientTokenPayload,
    maximum_size_in_bytes: u64,
) -> Result<HandleUploadResponse, ProxyError> {
    let mut options = ClientTokenOptions::new(payload.pathname, maximum_size_in_bytes);
    options.on_upload_completed = Some(OnUploadCompleted {
        callback_url: payload.callback_url,
        token_payload: payload.client_payload,
    });

    let client_token = generate_client_token(key, &options)
        .map_err(|e| ProxyError::BlobHandleUploadFailed(e.to_string()))?;

    tracing::info!(
        pathname = %options.pathname,
        multipart = payload.multipart,
        "issued blob client token"
    );
    Ok(HandleUploadResponse::GenerateClientToken { client_token })
}

fn confirm_upload(
    key: &ReadWriteToken,
    headers: &HeaderMap,
    raw_body: &[u8],
    payload: UploadCompletedPayload,
) -> Result<HandleUploadResponse, ProxyError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            ProxyError::BlobHandleUploadFailed(format!("missing {} header", SIGNATURE_HEADER))
        })?;

    verify_signature(raw_body, signature, key)
        .map_err(|e| ProxyError::BlobHandleUploadFailed(e.to_string()))?;

    tracing::info!(
        url = %payload.blob.url,
        pathname = %payload.blob.pathname,
        "blob upload completed"
    );
    Ok(HandleUploadResponse::UploadCompleted {
        response: "ok".to_string(),
    })
}

// Client implementation - asks the proxy to handle one upload event
impl ApiRequest for HandleUploadBody {
    type Response = HandleUploadResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join(PATH)?;
        Ok(client.post(full_url).json(&self))
    }
}

/// Body a client sends to obtain a token for `pathname`
pub fn token_request(pathname: &str, multipart: bool, client_payload: Option<Value>) -> HandleUploadBody {
    HandleUploadBody::GenerateClientToken(GenerateClientTokenPayload {
        pathname: pathname.to_string(),
        callback_url: None,
        client_payload,
        multipart,
    })
}
