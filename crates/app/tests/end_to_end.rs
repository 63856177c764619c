mod support;

use std::fs;

use bytes::Bytes;
use url::Url;

use common::digest::sha1_hex;
use common::selection::FileSelection;
use sitepush::blob::{BlobUploader, MULTIPART_THRESHOLD};
use sitepush::deploy::{DeployEvent, DeployForm, DeployOptions, DeployPhase, Deployer, HttpTransport};
use sitepush::http_server::api::client::ApiClient;

use support::*;

struct Harness {
    hosting: FakeHosting,
    store: FakeBlobStore,
    proxy: Url,
    blob_api: Url,
}

async fn harness() -> Harness {
    let hosting = FakeHosting::default();
    let store = FakeBlobStore::default();

    let hosting_url = serve(hosting.router()).await;
    let blob_api = serve(store.router()).await;
    let proxy = serve(proxy_router(&hosting_url, credentials()).await).await;

    Harness {
        hosting,
        store,
        proxy,
        blob_api,
    }
}

impl Harness {
    fn uploader(&self) -> BlobUploader {
        let api = ApiClient::new(&self.proxy).unwrap();
        BlobUploader::new(api, self.blob_api.clone()).unwrap()
    }

    fn transport(&self) -> HttpTransport {
        HttpTransport::new(ApiClient::new(&self.proxy).unwrap(), self.uploader())
    }
}

#[tokio::test]
async fn test_deploy_demo_site() {
    let harness = harness().await;

    let dir = tempfile::tempdir().unwrap();
    let site = dir.path().join("site");
    fs::create_dir_all(site.join("css")).unwrap();
    fs::write(
        site.join("index.html"),
        r#"<html><body><img src="logo.png"><link href="css/site.css"></body></html>"#,
    )
    .unwrap();
    fs::write(site.join("css/site.css"), "body { margin: 0 }").unwrap();
    let logo = vec![0x89u8; 10 * 1024];
    fs::write(site.join("logo.png"), &logo).unwrap();

    let selection = FileSelection::from_directory(&site).unwrap();
    let form = DeployForm::new("demo".to_string(), selection);

    let mut deployer = Deployer::new(harness.transport(), DeployOptions::default());
    let mut events = deployer.take_events().unwrap();
    let outcome = deployer.deploy(&form).await.unwrap();

    assert_eq!(outcome.url, "https://demo-abc.vercel.app");
    assert_eq!(deployer.phase(), DeployPhase::Done);

    // Media went straight to the blob store, under its base name
    let blobs = harness.store.blobs();
    assert_eq!(blobs.len(), 1);
    assert_eq!(blobs[0].pathname, "logo.png");
    assert_eq!(blobs[0].size, logo.len());
    assert_eq!(blobs[0].content_type.as_deref(), Some("image/png"));
    assert_eq!(blobs[0].random_suffix.as_deref(), Some("1"));

    let logo_url = "https://teststore42.public.blob.example/logo-Xy7Qz.png";
    assert_eq!(outcome.blob_urls.get("logo.png"), Some(logo_url));

    // Text files reached the file store rewritten, under their SHA-1
    let expected_index = format!(
        r#"<html><body><img src="{}"><link href="css/site.css"></body></html>"#,
        logo_url
    );
    let files = harness.hosting.files();
    assert_eq!(files.len(), 2);
    let index = files
        .iter()
        .find(|f| f.body == expected_index.as_bytes())
        .expect("rewritten index.html uploaded");
    assert_eq!(index.digest.as_deref(), Some(sha1_hex(expected_index.as_bytes()).as_str()));
    assert!(files.iter().any(|f| f.body == b"body { margin: 0 }"));

    // The manifest lists text files only
    let deployments = harness.hosting.deployments();
    assert_eq!(deployments.len(), 1);
    let body = &deployments[0].body;
    assert_eq!(body["name"], "demo");
    assert_eq!(body["target"], "production");
    let manifest = body["files"].as_array().unwrap();
    assert_eq!(manifest.len(), 2);
    let entry = manifest
        .iter()
        .find(|e| e["file"] == "index.html")
        .unwrap();
    assert_eq!(entry["sha"], sha1_hex(expected_index.as_bytes()));
    assert_eq!(entry["size"], expected_index.len() as u64);
    assert!(manifest.iter().all(|e| e["file"] != "logo.png"));
    assert_eq!(outcome.manifest.len(), 2);

    drop(deployer);
    let mut lines = Vec::new();
    while let Some(event) = events.recv().await {
        if let DeployEvent::Log(line) = event {
            lines.push(line);
        }
    }
    assert!(!lines.iter().any(|l| l.contains("index.html not found")));
    assert!(lines.contains(&"media: 1".to_string()));
    assert!(lines.contains(&"blob ok: logo.png".to_string()));
    assert!(lines.contains(&"text: 2".to_string()));
    assert!(lines.contains(&"create deployment".to_string()));
    assert_eq!(lines.last().map(String::as_str), Some("url: https://demo-abc.vercel.app"));
}

#[tokio::test]
async fn test_deploy_reports_upload_rejection() {
    let harness = harness().await;
    harness
        .hosting
        .reply_with(axum::http::StatusCode::PAYLOAD_TOO_LARGE, "file too large");

    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("index.html"), "<p>hi</p>").unwrap();
    let selection = FileSelection::from_directory(dir.path()).unwrap();
    let form = DeployForm::new("demo".to_string(), selection);

    let mut deployer = Deployer::new(harness.transport(), DeployOptions::default());
    let error = deployer.deploy(&form).await.unwrap_err();

    assert_eq!(error.to_string(), "upload failed: HTTP 413 file too large");
    assert_eq!(deployer.phase(), DeployPhase::Failed);
    assert!(harness.hosting.deployments().is_empty());
}

#[tokio::test]
async fn test_large_media_uses_multipart_upload() {
    let harness = harness().await;

    let size = MULTIPART_THRESHOLD as usize + 1;
    let content = Bytes::from(vec![7u8; size]);
    let blob = harness
        .uploader()
        .upload("clip.mp4", content)
        .await
        .unwrap();

    assert_eq!(blob.pathname, "clip.mp4");
    assert_eq!(blob.url, "https://teststore42.public.blob.example/clip-Xy7Qz.mp4");

    let blobs = harness.store.blobs();
    assert_eq!(blobs.len(), 1);
    assert_eq!(blobs[0].parts, 7);
    assert_eq!(blobs[0].size, size);
    assert_eq!(blobs[0].content_type.as_deref(), Some("video/mp4"));
}

#[tokio::test]
async fn test_blob_store_rejects_token_for_other_pathname() {
    let harness = harness().await;

    // Ask the proxy for a token scoped to one pathname, then use it for another
    let api = ApiClient::new(&harness.proxy).unwrap();
    let token = match api
        .call(sitepush::http_server::api::blob_upload::token_request("a.png", false, None))
        .await
        .unwrap()
    {
        common::blob::HandleUploadResponse::GenerateClientToken { client_token } => client_token,
        other => panic!("unexpected response: {:?}", other),
    };

    let mut url = harness.blob_api.clone();
    url.query_pairs_mut().append_pair("pathname", "b.png");
    let response = reqwest::Client::new()
        .put(url)
        .bearer_auth(token)
        .body("x")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::FORBIDDEN);
    assert!(harness.store.blobs().is_empty());
}
