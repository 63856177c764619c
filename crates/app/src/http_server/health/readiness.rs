use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tokio::time::timeout;

use super::data_source::*;

const READINESS_TIMEOUT: Duration = Duration::from_secs(5);

/// 200 once every proxy has the credentials it needs, 503 otherwise.
/// The failure body names the missing variables, never their values.
#[tracing::instrument]
pub async fn handler(data_src: StateDataSource) -> Response {
    let (status, body) = match timeout(READINESS_TIMEOUT, data_src.is_ready()).await {
        Ok(Ok(())) => (StatusCode::OK, json!({ "status": "ok" })),
        Ok(Err(DataSourceError::MissingCredentials(missing))) => {
            tracing::warn!(?missing, "readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                json!({ "status": "failure", "missing": missing }),
            )
        }
        Err(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            json!({ "status": "failure", "message": "readiness check timed out" }),
        ),
    };
    (status, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use http_body_util::BodyExt;

    use super::*;
    use crate::http_server::health::data_source::tests::*;

    async fn check(readiness: MockReadiness) -> (StatusCode, serde_json::Value) {
        let response = handler(StateDataSource::new(Arc::new(readiness))).await;
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_ready() {
        let (status, body) = check(MockReadiness::Ready).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn test_lists_missing_credentials() {
        let (status, body) =
            check(MockReadiness::Missing(vec!["VERCEL_TOKEN", "BLOB_READ_WRITE_TOKEN"])).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["missing"], json!(["VERCEL_TOKEN", "BLOB_READ_WRITE_TOKEN"]));
    }
}
