use std::net::SocketAddr;

use clap::Args;

use sitepush::service_config::Credentials;
use sitepush::state::AppConfig;
use sitepush::{spawn_service, ServiceConfig};

#[derive(Args, Debug, Clone)]
pub struct Serve {
    /// Override the listen port (default from config)
    #[arg(long)]
    pub port: Option<u16>,

    /// Directory for log files (logs to stdout only if not set)
    #[arg(long)]
    pub log_dir: Option<std::path::PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error("config error: {0}")]
    Config(#[from] sitepush::StateError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Serve {
    type Error = ServeError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let app_config = AppConfig::load(ctx.config_path.clone())?;

        let mut config = ServiceConfig::new(&app_config, Credentials::from_env());
        if let Some(port) = self.port {
            config.listen_addr = SocketAddr::from(([0, 0, 0, 0], port));
        }
        config.log_dir = self.log_dir.clone();

        spawn_service(&config).await;
        Ok("server stopped".to_string())
    }
}
