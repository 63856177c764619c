use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

/// Failures reported by the proxies themselves, as opposed to upstream
/// replies which are relayed untouched.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("method not allowed")]
    MethodNotAllowed,
    #[error("request body is not valid JSON")]
    InvalidJson,
    #[error("server has no VERCEL_TOKEN configured")]
    MissingToken,
    #[error("x-vercel-digest header is missing")]
    MissingDigest,
    #[error("deployment needs a name and at least one file")]
    MissingNameOrFiles,
    /// The blob client integration could not be loaded. The protocol is
    /// compiled in, so the handlers never raise this; the code stays part of
    /// the wire taxonomy for clients that match on it.
    #[error("blob integration unavailable: {0}")]
    BlobImportFailed(String),
    #[error("blob upload handling failed: {0}")]
    BlobHandleUploadFailed(String),
    #[error("upstream request failed: {0}")]
    UpstreamRequestFailed(String),
}

/// JSON error body: `{"error": <code>, "detail"?: <message>}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ProxyError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            ProxyError::MethodNotAllowed => "method_not_allowed",
            ProxyError::InvalidJson => "invalid_json",
            ProxyError::MissingToken => "missing_VERCEL_TOKEN",
            ProxyError::MissingDigest => "missing_x-vercel-digest",
            ProxyError::MissingNameOrFiles => "missing_name_or_files",
            ProxyError::BlobImportFailed(_) => "blob_import_failed",
            ProxyError::BlobHandleUploadFailed(_) => "blob_handle_upload_failed",
            ProxyError::UpstreamRequestFailed(_) => "upstream_request_failed",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ProxyError::InvalidJson
            | ProxyError::MissingDigest
            | ProxyError::MissingNameOrFiles => StatusCode::BAD_REQUEST,
            ProxyError::MissingToken
            | ProxyError::BlobImportFailed(_)
            | ProxyError::BlobHandleUploadFailed(_)
            | ProxyError::UpstreamRequestFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn detail(&self) -> Option<String> {
        match self {
            ProxyError::BlobImportFailed(detail)
            | ProxyError::BlobHandleUploadFailed(detail)
            | ProxyError::UpstreamRequestFailed(detail) => Some(detail.clone()),
            _ => None,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(code = self.code(), "proxy error: {}", self);
        } else {
            tracing::warn!(code = self.code(), "rejected request: {}", self);
        }

        let body = ErrorBody {
            error: self.code().to_string(),
            detail: self.detail(),
        };
        // serializing two strings cannot fail
        let body = serde_json::to_string(&body).unwrap_or_default();
        (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
    }
}

/// Route fallback for any method other than POST
pub async fn method_not_allowed() -> ProxyError {
    ProxyError::MethodNotAllowed
}
