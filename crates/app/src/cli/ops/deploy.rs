use std::path::PathBuf;

use clap::Args;
use url::Url;

use common::selection::{FileSelection, SelectionError};
use sitepush::blob::{BlobError, BlobUploader, DEFAULT_BLOB_API_URL};
use sitepush::deploy::{
    DeployError, DeployEvent, DeployForm, DeployOptions, Deployer, HttpTransport,
    DEFAULT_MEDIA_CONCURRENCY,
};

#[derive(Args, Debug, Clone)]
pub struct Deploy {
    /// Project name for the deployment
    #[arg(long)]
    pub name: String,

    /// Directory to publish, walked recursively
    #[arg(long, conflicts_with = "files")]
    pub dir: Option<PathBuf>,

    /// Individual files to publish. Paths are taken relative to the working
    /// directory (or, outside it, to the folder holding them all) and the
    /// top-level folder of each is dropped
    #[arg(long, num_args = 1..)]
    pub files: Vec<PathBuf>,

    /// Blob store API the media files are uploaded to
    #[arg(long, default_value = DEFAULT_BLOB_API_URL)]
    pub blob_api_url: Url,

    /// How many media files to upload at once
    #[arg(long, default_value_t = DEFAULT_MEDIA_CONCURRENCY)]
    pub media_concurrency: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum DeployOpError {
    #[error("pass --dir or --files")]
    NoSelection,

    #[error("{0}")]
    Selection(#[from] SelectionError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Blob(#[from] BlobError),

    #[error("{0}")]
    Deploy(#[from] DeployError),
}

impl Deploy {
    fn selection(&self) -> Result<FileSelection, DeployOpError> {
        if let Some(dir) = &self.dir {
            return Ok(FileSelection::from_directory(dir)?);
        }
        if !self.files.is_empty() {
            let base = std::env::current_dir()?;
            return Ok(FileSelection::from_file_list(&base, &self.files)?);
        }
        Err(DeployOpError::NoSelection)
    }
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Deploy {
    type Error = DeployOpError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let selection = self.selection()?;
        println!("{}", selection.summary());

        let form = DeployForm::new(self.name.clone(), selection);
        if !form.can_deploy() {
            return Err(DeployError::NotReady.into());
        }

        let blobs = BlobUploader::new(ctx.client.clone(), self.blob_api_url.clone())?;
        let transport = HttpTransport::new(ctx.client.clone(), blobs);
        let options = DeployOptions {
            media_concurrency: self.media_concurrency,
        };

        let mut deployer = Deployer::new(transport, options);
        // Print the running log as it happens
        let printer = deployer.take_events().map(|mut events| {
            tokio::spawn(async move {
                while let Some(event) = events.recv().await {
                    if let DeployEvent::Log(line) = event {
                        println!("{}", line);
                    }
                }
            })
        });

        let result = deployer.deploy(&form).await;
        drop(deployer);
        if let Some(printer) = printer {
            let _ = printer.await;
        }

        let outcome = result?;
        Ok(outcome.url)
    }
}
