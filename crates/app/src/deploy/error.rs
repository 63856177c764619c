use crate::blob::BlobError;
use crate::http_server::api::client::ApiError;

use super::phase::DeployPhase;

#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    #[error("enter a project name and pick at least one file")]
    NotReady,

    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("blob upload failed for {path}: {source}")]
    Blob {
        path: String,
        #[source]
        source: BlobError,
    },

    #[error("upload failed: HTTP {status}{}", body_suffix(.body))]
    Upload { status: u16, body: String },

    #[error("create failed: HTTP {status}{}", body_suffix(.body))]
    Create { status: u16, body: String },

    #[error("create failed: response without url")]
    MissingUrl,

    #[error("create failed: unreadable response: {0}")]
    InvalidResponse(#[from] serde_json::Error),

    #[error("request failed: {0}")]
    Api(#[from] ApiError),

    #[error("cannot move from {from} to {to}")]
    Transition { from: DeployPhase, to: DeployPhase },
}

fn body_suffix(body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        String::new()
    } else {
        format!(" {}", body)
    }
}
