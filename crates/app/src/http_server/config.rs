use std::net::SocketAddr;

use crate::ServiceConfig;

/// Largest request body the proxies accept
pub const MAX_BODY_BYTES: usize = 100 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct Config {
    // Listen address
    pub listen_addr: SocketAddr,
    // log level for http tracing
    pub log_level: tracing::Level,
    // request body ceiling
    pub max_body_bytes: usize,
}

impl Config {
    pub fn new(listen_addr: SocketAddr) -> Self {
        tracing::info!("Creating HTTP server Config: listen_addr={}", listen_addr);
        Self {
            listen_addr,
            log_level: tracing::Level::INFO,
            max_body_bytes: MAX_BODY_BYTES,
        }
    }
}

impl From<&ServiceConfig> for Config {
    fn from(service_config: &ServiceConfig) -> Self {
        Self {
            log_level: service_config.log_level,
            ..Self::new(service_config.listen_addr)
        }
    }
}
