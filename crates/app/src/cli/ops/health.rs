use clap::Args;

use sitepush::service_config::{
    Credentials, ENV_BLOB_READ_WRITE_TOKEN, ENV_VERCEL_TEAM_ID, ENV_VERCEL_TEAM_SLUG,
    ENV_VERCEL_TOKEN,
};
use sitepush::state::AppConfig;

#[derive(Args, Debug, Clone)]
pub struct Health;

#[derive(Debug, thiserror::Error)]
pub enum HealthError {
    #[error("Health check failed: {0}")]
    Failed(String),
}

fn presence(value: &Option<String>) -> &'static str {
    if value.is_some() {
        "set"
    } else {
        "missing"
    }
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Health {
    type Error = HealthError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let mut lines = Vec::new();

        // 1. Local config and credentials
        lines.push("Config:".to_string());
        match AppConfig::path(ctx.config_path.clone()) {
            Ok(path) => lines.push(format!("  file:         {}", path.display())),
            Err(e) => lines.push(format!("  file:         {}", e)),
        }
        match AppConfig::load(ctx.config_path.clone()) {
            Ok(config) => {
                lines.push(format!("  listen_port:  {}", config.listen_port));
                lines.push(format!("  api_base_url: {}", config.api_base_url));
            }
            Err(e) => {
                lines.push(format!("  error: {}", e));
            }
        }

        let credentials = Credentials::from_env();
        lines.push(String::new());
        lines.push("Environment:".to_string());
        for (key, value) in [
            (ENV_VERCEL_TOKEN, &credentials.api_token),
            (ENV_VERCEL_TEAM_ID, &credentials.team_id),
            (ENV_VERCEL_TEAM_SLUG, &credentials.team_slug),
            (ENV_BLOB_READ_WRITE_TOKEN, &credentials.blob_read_write_token),
        ] {
            lines.push(format!("  {:<22}{}", format!("{}:", key), presence(value)));
        }

        // 2. Server liveness and readiness
        let base = ctx.client.base_url();
        let client = ctx.client.http_client();

        lines.push(String::new());
        lines.push(format!("Server ({}):", base));

        for probe in ["livez", "readyz"] {
            let url = format!("{}/_status/{}", base.as_str().trim_end_matches('/'), probe);
            let status = match client.get(&url).send().await {
                Ok(resp) if resp.status().is_success() => "OK".to_string(),
                Ok(resp) => format!("UNHEALTHY ({})", resp.status()),
                Err(_) => "NOT REACHABLE".to_string(),
            };
            lines.push(format!("  {:<7} {}", format!("{}:", probe), status));
        }

        Ok(lines.join("\n"))
    }
}
