#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::body::{Body, Bytes};
use axum::extract::{DefaultBodyLimit, Query, State};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{post, put};
use axum::{Json, Router};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use url::Url;

use common::blob::{
    verify_client_token, MultipartPart, MultipartUpload, PutBlobResult, ReadWriteToken,
};
use sitepush::service_config::Credentials;
use sitepush::state::AppConfig;
use sitepush::{http_server, ServiceConfig, ServiceState};

pub const RW_TOKEN: &str = "vercel_blob_rw_TestStore42_c0ffee";
pub const API_TOKEN: &str = "test-api-token";

pub fn credentials() -> Credentials {
    Credentials {
        api_token: Some(API_TOKEN.to_string()),
        team_id: None,
        team_slug: None,
        blob_read_write_token: Some(RW_TOKEN.to_string()),
    }
}

pub fn read_write_token() -> ReadWriteToken {
    ReadWriteToken::parse(RW_TOKEN).unwrap()
}

/// Proxy router whose upstream is `api_base`
pub async fn proxy_router(api_base: &Url, credentials: Credentials) -> Router {
    let app_config = AppConfig {
        api_base_url: api_base.clone(),
        ..AppConfig::default()
    };
    let config = ServiceConfig::new(&app_config, credentials);
    let state = ServiceState::from_config(&config).await.unwrap();
    http_server::router(http_server::Config::from(&config), state)
}

/// Serve `router` on an ephemeral local port
pub async fn serve(router: Router) -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    Url::parse(&format!("http://{}", addr)).unwrap()
}

/// A local URL nothing listens on
pub async fn dead_url() -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    Url::parse(&format!("http://{}", addr)).unwrap()
}

pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Bytes) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, body)
}

pub async fn send_json(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, body) = send(router, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

pub fn post_request(uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(body.into())
        .unwrap()
}

// Hosting API fake

#[derive(Debug, Clone)]
pub struct RecordedFile {
    pub digest: Option<String>,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub content_length: Option<String>,
    pub query: HashMap<String, String>,
    pub body: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct RecordedDeployment {
    pub authorization: Option<String>,
    pub query: HashMap<String, String>,
    pub body: Value,
}

#[derive(Debug, Default)]
pub struct HostingLog {
    pub files: Vec<RecordedFile>,
    pub deployments: Vec<RecordedDeployment>,
    /// Canned reply for every call; `None` answers like the real API
    pub reply: Option<(StatusCode, String)>,
}

#[derive(Clone, Default)]
pub struct FakeHosting(pub Arc<Mutex<HostingLog>>);

impl FakeHosting {
    pub fn router(&self) -> Router {
        Router::new()
            .route("/v2/files", post(hosting_files))
            .route("/v13/deployments", post(hosting_deployments))
            .layer(DefaultBodyLimit::disable())
            .with_state(self.clone())
    }

    pub fn reply_with(&self, status: StatusCode, body: &str) {
        self.0.lock().unwrap().reply = Some((status, body.to_string()));
    }

    pub fn files(&self) -> Vec<RecordedFile> {
        self.0.lock().unwrap().files.clone()
    }

    pub fn deployments(&self) -> Vec<RecordedDeployment> {
        self.0.lock().unwrap().deployments.clone()
    }
}

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn hosting_files(
    State(fake): State<FakeHosting>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let mut log = fake.0.lock().unwrap();
    log.files.push(RecordedFile {
        digest: header(&headers, "x-vercel-digest"),
        authorization: header(&headers, "authorization"),
        content_type: header(&headers, "content-type"),
        content_length: header(&headers, "content-length"),
        query,
        body: body.to_vec(),
    });
    match &log.reply {
        Some((status, body)) => (*status, body.clone()).into_response(),
        None => (StatusCode::OK, "").into_response(),
    }
}

async fn hosting_deployments(
    State(fake): State<FakeHosting>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut log = fake.0.lock().unwrap();
    let name = body["name"].as_str().unwrap_or_default().to_string();
    log.deployments.push(RecordedDeployment {
        authorization: header(&headers, "authorization"),
        query,
        body,
    });
    match &log.reply {
        Some((status, body)) => (*status, body.clone()).into_response(),
        None => Json(json!({
            "id": "dpl_test",
            "url": format!("{}-abc.vercel.app", name),
            "readyState": "QUEUED"
        }))
        .into_response(),
    }
}

// Blob store fake

#[derive(Debug, Clone)]
pub struct RecordedBlob {
    pub pathname: String,
    pub content_type: Option<String>,
    pub random_suffix: Option<String>,
    pub size: usize,
    pub parts: usize,
}

#[derive(Debug, Default)]
pub struct BlobLog {
    pub blobs: Vec<RecordedBlob>,
    /// upload id -> (pathname, received parts)
    pub uploads: HashMap<String, (String, Vec<usize>)>,
}

#[derive(Clone, Default)]
pub struct FakeBlobStore(pub Arc<Mutex<BlobLog>>);

impl FakeBlobStore {
    pub fn router(&self) -> Router {
        Router::new()
            .route("/", put(blob_put))
            .route("/mpu", post(blob_mpu).put(blob_mpu))
            .layer(DefaultBodyLimit::disable())
            .with_state(self.clone())
    }

    pub fn blobs(&self) -> Vec<RecordedBlob> {
        self.0.lock().unwrap().blobs.clone()
    }
}

/// Public URL with a random suffix between stem and extension
fn blob_url(pathname: &str) -> String {
    match pathname.rsplit_once('.') {
        Some((stem, ext)) => format!("https://teststore42.public.blob.example/{}-Xy7Qz.{}", stem, ext),
        None => format!("https://teststore42.public.blob.example/{}-Xy7Qz", pathname),
    }
}

fn blob_result(pathname: &str, content_type: Option<String>) -> PutBlobResult {
    let url = blob_url(pathname);
    PutBlobResult {
        download_url: Some(format!("{}?download=1", url)),
        url,
        pathname: pathname.to_string(),
        content_type,
        content_disposition: Some(format!("inline; filename=\"{}\"", pathname)),
    }
}

/// Check the bearer client token against the store secret and the pathname
fn authorize(headers: &HeaderMap, pathname: &str) -> Result<(), Response> {
    let token = header(headers, "authorization")
        .and_then(|v| v.strip_prefix("Bearer ").map(str::to_string))
        .ok_or_else(|| (StatusCode::UNAUTHORIZED, "no token").into_response())?;
    let options = verify_client_token(&read_write_token(), &token)
        .map_err(|e| (StatusCode::FORBIDDEN, e.to_string()).into_response())?;
    if options.pathname != pathname {
        return Err((StatusCode::FORBIDDEN, "pathname mismatch").into_response());
    }
    Ok(())
}

async fn blob_put(
    State(fake): State<FakeBlobStore>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let pathname = query.get("pathname").cloned().unwrap_or_default();
    if let Err(rejection) = authorize(&headers, &pathname) {
        return rejection;
    }

    let content_type = header(&headers, "x-content-type");
    fake.0.lock().unwrap().blobs.push(RecordedBlob {
        pathname: pathname.clone(),
        content_type: content_type.clone(),
        random_suffix: header(&headers, "x-add-random-suffix"),
        size: body.len(),
        parts: 0,
    });
    Json(blob_result(&pathname, content_type)).into_response()
}

async fn blob_mpu(
    State(fake): State<FakeBlobStore>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let pathname = query.get("pathname").cloned().unwrap_or_default();
    if let Err(rejection) = authorize(&headers, &pathname) {
        return rejection;
    }

    let mut log = fake.0.lock().unwrap();
    match header(&headers, "x-mpu-action").as_deref() {
        Some("create") => {
            let upload_id = format!("upload-{}", log.uploads.len() + 1);
            log.uploads
                .insert(upload_id.clone(), (pathname.clone(), Vec::new()));
            Json(MultipartUpload {
                key: format!("keys/{}", pathname),
                upload_id,
            })
            .into_response()
        }
        Some("upload") => {
            let upload_id = header(&headers, "x-mpu-upload-id").unwrap_or_default();
            let part_number = header(&headers, "x-mpu-part-number").unwrap_or_default();
            match log.uploads.get_mut(&upload_id) {
                Some((_, parts)) => {
                    parts.push(body.len());
                    Json(json!({ "etag": format!("etag-{}", part_number) })).into_response()
                }
                None => (StatusCode::NOT_FOUND, "unknown upload").into_response(),
            }
        }
        Some("complete") => {
            let upload_id = header(&headers, "x-mpu-upload-id").unwrap_or_default();
            let listed: Vec<MultipartPart> = match serde_json::from_slice(&body) {
                Ok(parts) => parts,
                Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
            };
            let Some((pathname, parts)) = log.uploads.remove(&upload_id) else {
                return (StatusCode::NOT_FOUND, "unknown upload").into_response();
            };
            if listed.len() != parts.len() {
                return (StatusCode::BAD_REQUEST, "part count mismatch").into_response();
            }

            let content_type = header(&headers, "x-content-type");
            log.blobs.push(RecordedBlob {
                pathname: pathname.clone(),
                content_type: content_type.clone(),
                random_suffix: header(&headers, "x-add-random-suffix"),
                size: parts.iter().sum(),
                parts: parts.len(),
            });
            Json(blob_result(&pathname, content_type)).into_response()
        }
        _ => (StatusCode::BAD_REQUEST, "unknown action").into_response(),
    }
}
