pub use clap::Parser;

use std::path::PathBuf;
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "sitepush")]
#[command(about = "Publish a directory of static files as a hosted deployment")]
pub struct Args {
    /// Address of the sitepush proxy server
    #[arg(long, global = true, default_value = "http://localhost:3000")]
    pub remote: Url,

    /// Path to the config file (defaults to ~/.sitepush/config.toml)
    #[arg(long, global = true)]
    pub config_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: crate::Command,
}
