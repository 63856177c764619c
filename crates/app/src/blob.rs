//! Direct-to-blob-store uploads authorized through the upload proxy.
//!
//! Small files go up in a single `PUT`; files at or above
//! [`MULTIPART_THRESHOLD`] use the store's multipart protocol in
//! [`PART_SIZE`] chunks.

use bytes::Bytes;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

use common::blob::{HandleUploadResponse, MultipartPart, MultipartUpload, PutBlobResult};

use crate::http_server::api::blob_upload::token_request;
use crate::http_server::api::client::{ApiClient, ApiError};

pub const DEFAULT_BLOB_API_URL: &str = "https://vercel.com/api/blob";

/// Protocol version sent with every blob store request
pub const BLOB_API_VERSION: &str = "7";

/// Files this large or larger are uploaded in parts
pub const MULTIPART_THRESHOLD: u64 = 50 * 1024 * 1024;

pub const PART_SIZE: usize = 8 * 1024 * 1024;

const MPU_ACTION_HEADER: &str = "x-mpu-action";
const MPU_KEY_HEADER: &str = "x-mpu-key";
const MPU_UPLOAD_ID_HEADER: &str = "x-mpu-upload-id";
const MPU_PART_NUMBER_HEADER: &str = "x-mpu-part-number";

#[derive(Debug, thiserror::Error)]
pub enum BlobError {
    #[error("client token request failed: {0}")]
    Token(#[from] ApiError),
    #[error("upload proxy answered with an unexpected event")]
    UnexpectedTokenResponse,
    #[error("blob store request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("invalid blob store URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("blob store returned HTTP {0} {1}")]
    Status(StatusCode, String),
}

#[derive(Debug, Deserialize)]
struct UploadedPart {
    etag: String,
}

#[derive(Debug, Clone)]
pub struct BlobUploader {
    proxy: ApiClient,
    blob_api: Url,
    client: Client,
}

impl BlobUploader {
    pub fn new(proxy: ApiClient, blob_api: Url) -> Result<Self, BlobError> {
        let client = Client::builder().build()?;
        Ok(Self {
            proxy,
            blob_api,
            client,
        })
    }

    /// Upload `content` under `pathname` and return the stored blob
    pub async fn upload(&self, pathname: &str, content: Bytes) -> Result<PutBlobResult, BlobError> {
        let multipart = content.len() as u64 >= MULTIPART_THRESHOLD;
        let token = self.client_token(pathname, multipart).await?;
        let content_type = mime_guess::from_path(pathname)
            .first_or_octet_stream()
            .to_string();

        if multipart {
            self.put_multipart(pathname, &token, &content_type, content)
                .await
        } else {
            self.put(pathname, &token, &content_type, content).await
        }
    }

    async fn client_token(&self, pathname: &str, multipart: bool) -> Result<String, BlobError> {
        match self
            .proxy
            .call(token_request(pathname, multipart, None))
            .await?
        {
            HandleUploadResponse::GenerateClientToken { client_token } => Ok(client_token),
            HandleUploadResponse::UploadCompleted { .. } => Err(BlobError::UnexpectedTokenResponse),
        }
    }

    async fn put(
        &self,
        pathname: &str,
        token: &str,
        content_type: &str,
        content: Bytes,
    ) -> Result<PutBlobResult, BlobError> {
        let url = self.endpoint("", pathname)?;
        tracing::debug!(%url, size = content.len(), "blob put");

        let request = self
            .authorized(self.client.put(url), token, content_type)
            .body(content);
        read_json(request).await
    }

    async fn put_multipart(
        &self,
        pathname: &str,
        token: &str,
        content_type: &str,
        content: Bytes,
    ) -> Result<PutBlobResult, BlobError> {
        let url = self.endpoint("mpu", pathname)?;

        let create = self
            .authorized(self.client.post(url.clone()), token, content_type)
            .header(MPU_ACTION_HEADER, "create");
        let upload: MultipartUpload = read_json(create).await?;
        let key = url::form_urlencoded::byte_serialize(upload.key.as_bytes()).collect::<String>();
        tracing::debug!(upload_id = %upload.upload_id, size = content.len(), "multipart upload created");

        let mut parts = Vec::new();
        for (index, chunk) in content.chunks(PART_SIZE).enumerate() {
            let part_number = index as u32 + 1;
            let request = self
                .authorized(self.client.put(url.clone()), token, content_type)
                .header(MPU_ACTION_HEADER, "upload")
                .header(MPU_KEY_HEADER, &key)
                .header(MPU_UPLOAD_ID_HEADER, &upload.upload_id)
                .header(MPU_PART_NUMBER_HEADER, part_number.to_string())
                .body(content.slice_ref(chunk));
            let part: UploadedPart = read_json(request).await?;
            tracing::debug!(part_number, "multipart part uploaded");
            parts.push(MultipartPart {
                etag: part.etag,
                part_number,
            });
        }

        let complete = self
            .authorized(self.client.post(url), token, content_type)
            .header(MPU_ACTION_HEADER, "complete")
            .header(MPU_KEY_HEADER, &key)
            .header(MPU_UPLOAD_ID_HEADER, &upload.upload_id)
            .json(&parts);
        read_json(complete).await
    }

    fn authorized(&self, builder: RequestBuilder, token: &str, content_type: &str) -> RequestBuilder {
        builder
            .header(AUTHORIZATION, format!("Bearer {}", token))
            .header("x-api-version", BLOB_API_VERSION)
            .header("x-content-type", content_type)
            .header("x-add-random-suffix", "1")
    }

    /// `{blob_api}/{path}?pathname=<pathname>`
    fn endpoint(&self, path: &str, pathname: &str) -> Result<Url, BlobError> {
        let mut base = self.blob_api.clone();
        if !base.path().ends_with('/') {
            let with_slash = format!("{}/", base.path());
            base.set_path(&with_slash);
        }
        let mut url = base.join(path)?;
        url.query_pairs_mut().append_pair("pathname", pathname);
        Ok(url)
    }
}

async fn read_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, BlobError> {
    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(BlobError::Status(status, body));
    }
    Ok(response.json::<T>().await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uploader(blob_api: &str) -> BlobUploader {
        let proxy = ApiClient::new(&Url::parse("http://localhost:3000").unwrap()).unwrap();
        BlobUploader::new(proxy, Url::parse(blob_api).unwrap()).unwrap()
    }

    #[test]
    fn test_simple_endpoint() {
        let url = uploader(DEFAULT_BLOB_API_URL)
            .endpoint("", "logo one.png")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://vercel.com/api/blob/?pathname=logo+one.png"
        );
    }

    #[test]
    fn test_multipart_endpoint() {
        let url = uploader("http://127.0.0.1:9100/")
            .endpoint("mpu", "clip.mp4")
            .unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:9100/mpu?pathname=clip.mp4");
    }

    #[test]
    fn test_multipart_threshold() {
        assert_eq!(MULTIPART_THRESHOLD, 52_428_800);
        // A file exactly at the threshold is split into 7 parts
        assert_eq!((MULTIPART_THRESHOLD as usize).div_ceil(PART_SIZE), 7);
    }
}
