use axum::http::header::{ACCEPT, CONTENT_TYPE, ORIGIN};
use axum::http::{HeaderName, Method};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Router;
use serde_json::Value;
use tower_http::cors::{Any, CorsLayer};

pub mod blob_upload;
pub mod client;
pub mod create_deployment;
pub mod error;
pub mod upload_file;

pub use error::{ErrorBody, ProxyError};

use crate::hosting::{UpstreamResponse, DIGEST_HEADER};
use crate::ServiceState;

pub fn router(state: ServiceState) -> Router<ServiceState> {
    let cors_layer = CorsLayer::new()
        .allow_methods(vec![Method::POST])
        .allow_headers(vec![
            ACCEPT,
            CONTENT_TYPE,
            ORIGIN,
            HeaderName::from_static(DIGEST_HEADER),
        ])
        .allow_origin(Any)
        .allow_credentials(false);

    Router::new()
        .route(
            "/blob-upload",
            post(blob_upload::handler).fallback(error::method_not_allowed),
        )
        .route(
            "/upload-file",
            post(upload_file::handler).fallback(error::method_not_allowed),
        )
        .route(
            "/create-deployment",
            post(create_deployment::handler).fallback(error::method_not_allowed),
        )
        .with_state(state)
        .layer(cors_layer)
}

/// Parse a request body as JSON, treating an empty body as `{}`
pub(crate) fn parse_json_body(body: &[u8]) -> Result<Value, ProxyError> {
    if body.is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_slice(body).map_err(|_| ProxyError::InvalidJson)
}

/// Hand an upstream reply back to the caller with its own status and body.
/// An empty body becomes `{}`.
pub(crate) fn relay(upstream: UpstreamResponse) -> Response {
    let status = upstream.status;
    let body = if upstream.body.is_empty() {
        bytes::Bytes::from_static(b"{}")
    } else {
        upstream.body
    };

    if !status.is_success() {
        tracing::warn!(status = status.as_u16(), "upstream rejected request");
    }
    (status, [(CONTENT_TYPE, "application/json")], body).into_response()
}
