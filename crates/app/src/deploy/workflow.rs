//! Deploy workflow.
//!
//! Drives one run from a filled-in [`DeployForm`] to a live deployment URL:
//! media to the blob store, text rewritten to point at the blob URLs, text
//! uploaded by digest, then the manifest submitted. Every step is awaited
//! before the next one starts and the first failure ends the run.

use bytes::Bytes;
use futures::stream::{self, StreamExt, TryStreamExt};
use tokio::sync::mpsc;

use common::classify::base_name;
use common::digest::sha1_hex;
use common::manifest::{CreateDeploymentRequest, ManifestEntry};
use common::rewrite::{rewrite_text, BlobUrlMap, RewrittenText};
use common::selection::{FileSelection, PickedFile};

use super::error::DeployError;
use super::events::DeployEvent;
use super::form::DeployForm;
use super::phase::DeployPhase;
use super::transport::DeployTransport;

/// Media uploads run one at a time unless configured otherwise
pub const DEFAULT_MEDIA_CONCURRENCY: usize = 1;

#[derive(Debug, Clone)]
pub struct DeployOptions {
    /// Upper bound on simultaneous media uploads. All of them finish before
    /// rewriting starts.
    pub media_concurrency: usize,
}

impl Default for DeployOptions {
    fn default() -> Self {
        Self {
            media_concurrency: DEFAULT_MEDIA_CONCURRENCY,
        }
    }
}

/// What a successful run produced
#[derive(Debug, Clone)]
pub struct DeployOutcome {
    /// Deployment URL, always with a scheme
    pub url: String,
    pub blob_urls: BlobUrlMap,
    pub manifest: Vec<ManifestEntry>,
}

pub struct Deployer<T> {
    transport: T,
    options: DeployOptions,
    phase: DeployPhase,
    events_tx: mpsc::UnboundedSender<DeployEvent>,
    events_rx: Option<mpsc::UnboundedReceiver<DeployEvent>>,
}

impl<T: DeployTransport> Deployer<T> {
    pub fn new(transport: T, options: DeployOptions) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            transport,
            options,
            phase: DeployPhase::Idle,
            events_tx,
            events_rx: Some(events_rx),
        }
    }

    /// Takes the event receiver. Can only be called once.
    pub fn take_events(&mut self) -> Option<mpsc::UnboundedReceiver<DeployEvent>> {
        self.events_rx.take()
    }

    pub fn phase(&self) -> DeployPhase {
        self.phase
    }

    /// Run one deploy. Progress is reported through the event channel; the
    /// returned error is the one that stopped the run.
    pub async fn deploy(&mut self, form: &DeployForm) -> Result<DeployOutcome, DeployError> {
        self.phase = DeployPhase::Idle;

        let result = match self.run(form).await {
            Ok(outcome) => self.enter(DeployPhase::Done).map(|_| outcome),
            Err(e) => Err(e),
        };

        match result {
            Ok(outcome) => {
                tracing::info!(url = %outcome.url, files = outcome.manifest.len(), "deploy completed");
                self.emit(DeployEvent::Done {
                    url: outcome.url.clone(),
                });
                Ok(outcome)
            }
            Err(e) => {
                tracing::error!(phase = %self.phase, error = %e, "deploy failed");
                if self.phase.can_advance_to(DeployPhase::Failed) {
                    self.phase = DeployPhase::Failed;
                    self.emit(DeployEvent::Phase(DeployPhase::Failed));
                }
                self.emit(DeployEvent::Failed {
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    async fn run(&mut self, form: &DeployForm) -> Result<DeployOutcome, DeployError> {
        self.enter(DeployPhase::Picking)?;
        let selection = form.selection();

        self.enter(DeployPhase::Validating)?;
        if !form.can_deploy() {
            return Err(DeployError::NotReady);
        }
        let name = form.project_name().to_string();
        if !selection.has_index() {
            self.log("warning: index.html not found");
        }

        self.enter(DeployPhase::UploadingMedia)?;
        let blob_urls = self.upload_media(selection).await?;

        self.enter(DeployPhase::RewritingText)?;
        let texts = self.rewrite_texts(selection, &blob_urls).await?;

        self.enter(DeployPhase::UploadingText)?;
        let manifest = self.upload_texts(texts).await?;

        self.enter(DeployPhase::CreatingDeployment)?;
        self.log("create deployment");
        let result = self
            .transport
            .create_deployment(CreateDeploymentRequest {
                name,
                files: manifest.clone(),
            })
            .await?;
        let url = result.display_url().ok_or(DeployError::MissingUrl)?;
        self.log(format!("url: {}", url));

        Ok(DeployOutcome {
            url,
            blob_urls,
            manifest,
        })
    }

    async fn upload_media(&self, selection: &FileSelection) -> Result<BlobUrlMap, DeployError> {
        let media: Vec<&PickedFile> = selection.media().collect();
        self.log(format!("media: {}", media.len()));

        let concurrency = self.options.media_concurrency.max(1);
        let uploads: Vec<_> = media
            .iter()
            .copied()
            .enumerate()
            .map(|(index, file)| async move {
                let rel = &file.relative_path;
                self.log(format!("blob upload: {}", rel));
                let content = read_file(file).await?;
                let url = self
                    .transport
                    .upload_media(upload_name(rel), content)
                    .await?;
                self.log(format!("blob ok: {}", rel));
                Ok::<_, DeployError>((index, url))
            })
            .collect();
        let mut uploaded: Vec<(usize, String)> = stream::iter(uploads)
            .buffer_unordered(concurrency)
            .try_collect()
            .await?;

        // completion order is arbitrary, the map follows selection order
        uploaded.sort_by_key(|(index, _)| *index);

        let mut blob_urls = BlobUrlMap::new();
        for (index, url) in uploaded {
            blob_urls.insert(media[index].relative_path.clone(), url);
        }
        Ok(blob_urls)
    }

    async fn rewrite_texts(
        &self,
        selection: &FileSelection,
        blob_urls: &BlobUrlMap,
    ) -> Result<Vec<RewrittenText>, DeployError> {
        let texts: Vec<&PickedFile> = selection.texts().collect();
        self.log(format!("text: {}", texts.len()));

        let mut rewritten = Vec::with_capacity(texts.len());
        for file in texts {
            let raw = read_file(file).await?;
            let text = rewrite_text(&String::from_utf8_lossy(&raw), blob_urls);
            rewritten.push(RewrittenText {
                relative_path: file.relative_path.clone(),
                text,
            });
            self.log(format!("rewrite ok: {}", file.relative_path));
        }
        Ok(rewritten)
    }

    async fn upload_texts(
        &self,
        texts: Vec<RewrittenText>,
    ) -> Result<Vec<ManifestEntry>, DeployError> {
        let mut manifest = Vec::with_capacity(texts.len());
        for RewrittenText {
            relative_path,
            text,
        } in texts
        {
            let content = Bytes::from(text.into_bytes());
            let sha = sha1_hex(&content);
            let size = content.len() as u64;

            self.log(format!("file upload: {}", relative_path));
            self.transport.upload_file(&sha, content).await?;

            manifest.push(ManifestEntry::new(&relative_path, sha, size));
            self.log(format!("file ok: {}", relative_path));
        }
        Ok(manifest)
    }

    fn enter(&mut self, next: DeployPhase) -> Result<(), DeployError> {
        if !self.phase.can_advance_to(next) {
            return Err(DeployError::Transition {
                from: self.phase,
                to: next,
            });
        }
        tracing::debug!(from = %self.phase, to = %next, "deploy phase");
        self.phase = next;
        self.emit(DeployEvent::Phase(next));
        Ok(())
    }

    fn log(&self, line: impl Into<String>) {
        let line = line.into();
        tracing::info!("{}", line);
        self.emit(DeployEvent::Log(line));
    }

    fn emit(&self, event: DeployEvent) {
        // nobody listening is fine
        let _ = self.events_tx.send(event);
    }
}

/// Blob pathname for a media file: its base name, or the whole path when
/// the base name is empty
fn upload_name(relative_path: &str) -> &str {
    match base_name(relative_path) {
        "" => relative_path,
        base => base,
    }
}

async fn read_file(file: &PickedFile) -> Result<Bytes, DeployError> {
    tokio::fs::read(&file.source)
        .await
        .map(Bytes::from)
        .map_err(|source| DeployError::Read {
            path: file.relative_path.clone(),
            source,
        })
}
